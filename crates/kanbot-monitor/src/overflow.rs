//! Overflow policy — reports lists holding more open cards than their
//! name-encoded capacity allows.
//!
//! Read-only and safe to re-run at any frequency: an unresolved overflow is
//! re-reported on every sweep until capacity is restored. There is no
//! suppression here on purpose.

use kanbot_core::types::{Board, List};

use crate::capacity::parse_capacity;

/// Check one list against its encoded capacity.
///
/// Returns at most one message, carrying board/list context, the observed and
/// limit counts, and a deep link to the board.
pub fn check_list(board: &Board, list: &List) -> Option<String> {
    let capacity = parse_capacity(&list.name);
    if capacity == 0 {
        return None;
    }
    let count = list.cards.len();
    if count <= capacity as usize {
        return None;
    }
    Some(format!(
        "task overflow detected in {} > {}: {}/{} https://trello.com/board/{}",
        board.name, list.name, count, capacity, board.id
    ))
}

/// Check every list of one board snapshot.
pub fn check_board(board: &Board, lists: &[List]) -> Vec<String> {
    lists
        .iter()
        .filter_map(|list| check_list(board, list))
        .collect()
}
