//! Browser side of the navigation protocol.
//!
//! The script intercepts marked links, requests stack payloads and applies
//! them to the live boundaries. Every document shell loads it.

use crate::protocol::CLIENT_SCRIPT_PATH;

/// Source of the router script served at [`CLIENT_SCRIPT_PATH`].
pub const CLIENT_SCRIPT: &str = include_str!("../../assets/router.js");

pub fn script_tag() -> String {
    format!("<script src=\"{}\" defer></script>", CLIENT_SCRIPT_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        BOUNDARY_ID_ATTR, BOUNDARY_VERSION_ATTR, CURRENT_PARAM, LINK_ATTR, OUTLET_ATTR,
        REPLACE_ATTR, ROUTER_HEADER, STACK_PARAM, VERSIONS_PARAM,
    };

    #[test]
    fn test_script_speaks_the_wire_protocol() {
        for name in [
            STACK_PARAM,
            CURRENT_PARAM,
            VERSIONS_PARAM,
            ROUTER_HEADER,
            LINK_ATTR,
            REPLACE_ATTR,
            BOUNDARY_ID_ATTR,
            BOUNDARY_VERSION_ATTR,
            OUTLET_ATTR,
        ] {
            assert!(CLIENT_SCRIPT.contains(&format!("\"{name}\"")), "{name}");
        }
        assert!(CLIENT_SCRIPT.contains("routePath"));
        assert!(!CLIENT_SCRIPT.contains("</script>"));
    }

    #[test]
    fn test_script_tag() {
        assert_eq!(script_tag(), "<script src=\"/_stack/router.js\" defer></script>");
    }
}
