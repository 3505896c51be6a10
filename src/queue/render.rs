//! Board projection: queue state to a message body.

use crate::events::QueueList;
use crate::platform::MessageBody;

use super::config::{Capacity, QueueConfig};
use super::QueueState;

/// Projects the current queue state into the board message body.
///
/// Columns: `Open` (demand capacity only) lists the available pool,
/// `Active n/max` lists active then pending users padded with `-` up to
/// the slot count, `Queued` lists waiting users in order.
pub(super) fn render_board(state: &QueueState, config: &QueueConfig, max_active: usize) -> MessageBody {
    let style = config.user_to_string.as_ref();
    let mut body = MessageBody::titled(config.title.clone());

    if matches!(config.capacity, Capacity::Demand) {
        let open: Vec<String> = state
            .available
            .iter()
            .map(|u| style(u, QueueList::Available))
            .collect();
        body = body.with_field(format!("Open - {}", open.len()), column(open), true);
    }

    let mut slots: Vec<String> = state
        .active
        .iter()
        .map(|u| style(u, QueueList::Active))
        .collect();
    slots.extend(
        state
            .pending
            .iter()
            .map(|u| style(u, QueueList::Pending)),
    );
    let header = if state.pending.is_empty() {
        format!("Active {}/{}", state.active.len(), max_active)
    } else {
        format!(
            "Active {}+{}/{}",
            state.active.len(),
            state.pending.len(),
            max_active
        )
    };
    pad(&mut slots, max_active.max(1));
    body = body.with_field(header, column(slots), true);

    let mut queued: Vec<String> = state
        .queue
        .iter()
        .map(|u| style(u, QueueList::Queue))
        .collect();
    pad(&mut queued, 1);
    body.with_field(format!("Queued - {}", state.queue.len()), column(queued), true)
}

fn pad(rows: &mut Vec<String>, min: usize) {
    while rows.len() < min {
        rows.push("-".to_string());
    }
}

fn column(rows: Vec<String>) -> String {
    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::UserRef;
    use crate::queue::QueueState;

    fn user(id: &str) -> UserRef {
        UserRef::new(id, format!("@{id}"))
    }

    #[test]
    fn test_fixed_board_pads_slots_with_dashes() {
        let mut state = QueueState::default();
        state.active.push(user("a"));
        state.queue.push(user("b"));

        let config = QueueConfig::new("Duos", Capacity::Fixed(3));
        let body = render_board(&state, &config, 3);

        assert_eq!(body.title.as_deref(), Some("Duos"));
        assert_eq!(body.fields.len(), 2);
        assert_eq!(body.fields[0].name, "Active 1/3");
        assert_eq!(body.fields[0].value, "@a\n-\n-");
        assert_eq!(body.fields[1].name, "Queued - 1");
        assert_eq!(body.fields[1].value, "@b");
    }

    #[test]
    fn test_pending_users_are_italicized_and_counted() {
        let mut state = QueueState::default();
        state.active.push(user("a"));
        state.pending.push(user("b"));

        let config = QueueConfig::new("q", Capacity::Fixed(2));
        let body = render_board(&state, &config, 2);

        assert_eq!(body.fields[0].name, "Active 1+1/2");
        assert_eq!(body.fields[0].value, "@a\n_@b_");
    }

    #[test]
    fn test_demand_board_lists_open_pool_first() {
        let mut state = QueueState::default();
        state.available.push(user("host"));
        state.available.push(user("host2"));

        let config = QueueConfig::new("q", Capacity::Demand);
        let body = render_board(&state, &config, 2);

        assert_eq!(body.fields[0].name, "Open - 2");
        assert_eq!(body.fields[0].value, "@host\n@host2");
        assert_eq!(body.fields[1].name, "Active 0/2");
        // No one active: a single placeholder row keeps the column visible.
        assert_eq!(body.fields[1].value, "-");
        assert_eq!(body.fields[2].value, "-");
    }
}
