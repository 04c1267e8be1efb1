//! Deciding which clicks become in-place navigations.

use url::Url;

use crate::client::navigator::NavigateOptions;

/// The anchor a click landed in (closest ancestor carrying the link marker).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorInfo {
    pub href: Option<String>,
    pub target: Option<String>,
    /// The anchor carries `data-stack-link`.
    pub stack_link: bool,
    /// `data-stack-replace="true"`.
    pub replace: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    pub button: u16,
    pub default_prevented: bool,
    pub meta_key: bool,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub anchor: Option<AnchorInfo>,
}

impl ClickEvent {
    /// Plain left click on `anchor`.
    pub fn on(anchor: AnchorInfo) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::default()
        }
    }

    fn is_modified(&self) -> bool {
        self.meta_key || self.ctrl_key || self.shift_key || self.alt_key
    }
}

/// Target and options when the click should be handled in place; `None`
/// leaves it to the browser.
pub fn intercept(event: &ClickEvent, location: &Url) -> Option<(Url, NavigateOptions)> {
    if event.default_prevented || event.button != 0 || event.is_modified() {
        return None;
    }

    let anchor = event.anchor.as_ref().filter(|a| a.stack_link)?;
    if anchor.target.as_deref().is_some_and(|t| !t.is_empty() && t != "_self") {
        return None;
    }

    let href = anchor.href.as_deref().filter(|h| !h.is_empty())?;
    let target = location.join(href).ok()?;
    if target.origin() != location.origin() {
        return None;
    }

    Some((target, NavigateOptions { replace: anchor.replace }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Url {
        Url::parse("http://localhost:3000/about").unwrap()
    }

    fn link(href: &str) -> AnchorInfo {
        AnchorInfo {
            href: Some(href.to_string()),
            stack_link: true,
            ..AnchorInfo::default()
        }
    }

    #[test]
    fn test_plain_click_intercepted() {
        let (target, options) = intercept(&ClickEvent::on(link("/shop?x=1")), &location()).unwrap();
        assert_eq!(target.as_str(), "http://localhost:3000/shop?x=1");
        assert!(!options.replace);

        let replace = AnchorInfo { replace: true, ..link("shop") };
        let (target, options) = intercept(&ClickEvent::on(replace), &location()).unwrap();
        assert_eq!(target.path(), "/shop");
        assert!(options.replace);

        let self_target = AnchorInfo { target: Some("_self".into()), ..link("/") };
        assert!(intercept(&ClickEvent::on(self_target), &location()).is_some());
    }

    #[test]
    fn test_ignored_clicks() {
        let modified = ClickEvent { ctrl_key: true, ..ClickEvent::on(link("/shop")) };
        assert!(intercept(&modified, &location()).is_none());

        let middle = ClickEvent { button: 1, ..ClickEvent::on(link("/shop")) };
        assert!(intercept(&middle, &location()).is_none());

        let prevented = ClickEvent { default_prevented: true, ..ClickEvent::on(link("/shop")) };
        assert!(intercept(&prevented, &location()).is_none());

        let unmarked = AnchorInfo { stack_link: false, ..link("/shop") };
        assert!(intercept(&ClickEvent::on(unmarked), &location()).is_none());

        let blank = AnchorInfo { target: Some("_blank".into()), ..link("/shop") };
        assert!(intercept(&ClickEvent::on(blank), &location()).is_none());

        assert!(intercept(&ClickEvent::on(link("https://example.com/")), &location()).is_none());
        assert!(intercept(&ClickEvent::default(), &location()).is_none());
    }
}
