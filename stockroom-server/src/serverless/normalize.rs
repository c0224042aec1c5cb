//! Stage-prefix path normalization.
//!
//! A platform that routes through a deployment stage prepends the stage to
//! every path it delivers ("/dev/api/v1/items"); the router only knows the
//! unprefixed paths.

use super::InvocationEvent;

/// Strip `stage_prefix` from each path-bearing field of the event.
///
/// Fields that do not start with the prefix are left untouched. Pure and
/// total: no I/O, no failure modes.
pub fn normalize(mut event: InvocationEvent, stage_prefix: &str) -> InvocationEvent {
    if stage_prefix.is_empty() {
        return event;
    }

    strip_stage_prefix(&mut event.path, stage_prefix);
    strip_stage_prefix(&mut event.raw_path, stage_prefix);
    strip_stage_prefix(&mut event.request_context.path, stage_prefix);
    event
}

fn strip_stage_prefix(field: &mut Option<String>, prefix: &str) {
    let Some(value) = field else { return };
    let Some(rest) = value.strip_prefix(prefix) else {
        return;
    };
    // Only strip on a segment boundary: "/dev" must not eat into
    // "/development/items".
    if rest.is_empty() {
        *value = "/".to_owned();
    } else if rest.starts_with('/') {
        *value = rest.to_owned();
    }
}
