//! Socket tagging.
//!
//! Elements that still carry a socket marker after decomposition get the
//! socket name folded into their tag (`button` → `button-af-sock-label`). The
//! tag identity survives the JSX conversion untouched, which is how the binder
//! later finds exactly these elements.

use crate::decompose::SOCKET_MARKER;
use crate::markup::{for_each_element_mut, MarkupNode};

pub const SOCKET_TAG_INFIX: &str = "-af-sock-";

pub fn socket_tag(tag: &str, socket: &str) -> String {
    format!("{}{}{}", tag, SOCKET_TAG_INFIX, socket)
}

/// Split a tagged name back into `(tag, socket)`.
pub fn split_socket_tag(tag: &str) -> Option<(&str, &str)> {
    tag.split_once(SOCKET_TAG_INFIX)
}

/// Record and tag every socket-marked element in document order.
/// Returns the declared socket names, duplicates included.
pub fn tag_sockets(nodes: &mut [MarkupNode]) -> Vec<String> {
    let mut sockets = Vec::new();
    for_each_element_mut(nodes, &mut |el| {
        if let Some(socket) = el.remove_attr(SOCKET_MARKER) {
            el.tag = socket_tag(&el.tag, &socket);
            sockets.push(socket);
        }
    });
    sockets
}

/// First socket name declared more than once, if any.
pub fn find_duplicate(sockets: &[String]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    sockets
        .iter()
        .find(|s| !seen.insert(s.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{parse_body, to_html};

    #[test]
    fn test_tag_sockets_in_document_order() {
        let mut nodes = parse_body(
            r#"<div af-sock="outer"><button af-sock="label" class="b">Click</button><af-nav af-sock="menu"></af-nav></div>"#,
            "test",
        )
        .unwrap();
        let sockets = tag_sockets(&mut nodes);
        assert_eq!(sockets, vec!["outer", "label", "menu"]);
        assert_eq!(
            to_html(&nodes),
            r#"<div-af-sock-outer><button-af-sock-label class="b">Click</button-af-sock-label><af-nav-af-sock-menu></af-nav-af-sock-menu></div-af-sock-outer>"#
        );
    }

    #[test]
    fn test_split_socket_tag() {
        assert_eq!(split_socket_tag("button-af-sock-label"), Some(("button", "label")));
        assert_eq!(
            split_socket_tag("af-nav-af-sock-my-menu"),
            Some(("af-nav", "my-menu"))
        );
        assert_eq!(split_socket_tag("af-nav"), None);
    }

    #[test]
    fn test_find_duplicate() {
        let sockets = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(find_duplicate(&sockets), Some("a"));
        assert_eq!(find_duplicate(&sockets[..2]), None);
    }
}
