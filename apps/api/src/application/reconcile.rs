//! Reconciliation — applies tool acknowledgments from an agent run to session state.
//!
//! Only tool-result messages are scanned. Agent-confirmed values are authoritative:
//! they overwrite whatever the regex pass or an earlier turn stored. Processing
//! order is message order, then token order, so the last token for a field wins.
//! Within one message only the last token per field is applied.

use tracing::debug;

use crate::agent::AgentMessage;
use crate::application::models::ApplicationState;
use crate::application::tool::decode_to_result;

/// Scans `messages` and applies every decoded `SET_<FIELD>:` token to `state`.
/// Returns true if any field value changed.
pub fn sync(state: &mut ApplicationState, messages: &[AgentMessage]) -> bool {
    let mut changed = false;

    for message in messages {
        let AgentMessage::ToolResult { content, .. } = message else {
            continue;
        };
        let decoded = decode_to_result(content);
        for (field, value) in decoded.present() {
            if state.set(field, value) {
                debug!(field = field.as_str(), "reconciled field from tool result");
                changed = true;
            }
        }
    }

    changed
}
