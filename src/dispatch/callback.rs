//! Outbound resource and callback address construction.
//!
//! Both addresses are pure functions of the configuration and the request
//! inputs, recomputed per call and never cached: the listener's address can
//! change across restarts, and the service-host override can be reconfigured
//! between sends.

use crate::config::CommunicatorConfig;

use super::ControlAction;

/// Header carrying the callback address in every outbound request.
pub const CALLBACK_URI_HEADER: &str = "CallbackUri";

/// Builds the address of the control endpoint on the target node.
///
/// The host defaults to the node's own name unless a service-host override
/// is configured (useful when node agents sit behind a shared gateway).
pub fn resource_uri(config: &CommunicatorConfig, target_node: &str, action: ControlAction) -> String {
    let host = config.service_host.as_deref().unwrap_or(target_node);
    format!(
        "http://{}:{}/api/{}/{}",
        host,
        config.node_service_port,
        target_node,
        action.action_name()
    )
}

/// Builds the callback address the remote node uses to report completion.
///
/// Opaque to the remote node, but must be dereferenceable by it, so it is
/// rooted at the listener's externally reachable base address.
pub fn callback_uri(config: &CommunicatorConfig, target_node: &str, action: ControlAction) -> String {
    format!(
        "{}/api/{}/{}",
        config.listener_base.trim_end_matches('/'),
        target_node,
        action.callback_action()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CommunicatorConfig {
        CommunicatorConfig::new("headnode", "http://headnode:50000")
    }

    #[test]
    fn resource_uri_defaults_to_node_name_as_host() {
        let uri = resource_uri(&config(), "node1", ControlAction::StartTask);
        assert_eq!(uri, "http://node1:50001/api/node1/starttask");
    }

    #[test]
    fn resource_uri_honors_service_host_override() {
        let config = config().with_service_host("gateway.internal");
        let uri = resource_uri(&config, "node1", ControlAction::Ping);
        assert_eq!(uri, "http://gateway.internal:50001/api/node1/ping");
    }

    #[test]
    fn callback_uri_is_rooted_at_listener_base() {
        let uri = callback_uri(&config(), "node1", ControlAction::EndTask);
        assert_eq!(uri, "http://headnode:50000/api/node1/taskcompleted");
    }

    #[test]
    fn callback_uri_tolerates_trailing_slash_in_base() {
        let mut config = config();
        config.listener_base = "http://headnode:50000/".to_string();

        let uri = callback_uri(&config, "node1", ControlAction::Ping);
        assert_eq!(uri, "http://headnode:50000/api/node1/computenodereported");
    }

    #[test]
    fn callback_uri_changes_when_base_changes() {
        let mut config = config();
        let before = callback_uri(&config, "node1", ControlAction::StartTask);

        // Listener restarted on a different address.
        config.listener_base = "http://10.0.0.4:50000".to_string();
        let after = callback_uri(&config, "node1", ControlAction::StartTask);

        assert_ne!(before, after);
        assert!(after.starts_with("http://10.0.0.4:50000/"));
    }
}
