//! Fixed weekly time grid: named slots, breaks, and the consecutive-slot relation
//! that defines where a 2-hour lab may start.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five scheduled teaching days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        };
        f.write_str(s)
    }
}

/// A named half-open interval, e.g. `"8:15-9:15"`. Interned as a small index into
/// the `TimeModel`'s slot table rather than carrying the string around everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u8);

/// The four contiguous runs of teaching slots with no break between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    Morning,
    Midday,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone)]
struct SlotEntry {
    label: String,
    is_break: bool,
    block: Option<Block>,
}

/// The fixed weekly slot grid, derived once per run. Not process-global: a fresh
/// `TimeModel` is built at the start of a pipeline invocation and threaded through
/// by reference.
#[derive(Debug, Clone)]
pub struct TimeModel {
    slots: Vec<SlotEntry>,
    teaching: Vec<SlotId>,
    consecutive: Vec<Option<SlotId>>,
}

impl TimeModel {
    /// Builds the default department slot grid described in §4.1 / §2 of the spec:
    /// two-slot morning/midday/afternoon/evening blocks separated by three named
    /// breaks.
    pub fn default_grid() -> Self {
        let mut slots = Vec::new();
        let mut push = |label: &str, is_break: bool, block: Option<Block>| {
            slots.push(SlotEntry {
                label: label.to_string(),
                is_break,
                block,
            });
        };

        push("8:15-9:15", false, Some(Block::Morning));
        push("9:15-10:15", false, Some(Block::Morning));
        push("10:15-10:30", true, None);
        push("10:30-11:30", false, Some(Block::Midday));
        push("11:30-12:30", false, Some(Block::Midday));
        push("12:30-1:15", true, None);
        push("1:15-2:15", false, Some(Block::Afternoon));
        push("2:15-3:15", false, Some(Block::Afternoon));
        push("3:15-3:30", true, None);
        push("3:30-4:30", false, Some(Block::Evening));
        push("4:30-5:30", false, Some(Block::Evening));

        let teaching: Vec<SlotId> = slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_break)
            .map(|(i, _)| SlotId(i as u8))
            .collect();

        let mut consecutive = vec![None; slots.len()];
        for w in teaching.windows(2) {
            let (a, b) = (w[0], w[1]);
            let block_a = slots[a.0 as usize].block;
            let block_b = slots[b.0 as usize].block;
            if block_a.is_some() && block_a == block_b {
                consecutive[a.0 as usize] = Some(b);
            }
        }

        TimeModel {
            slots,
            teaching,
            consecutive,
        }
    }

    /// All slots in order, including breaks.
    pub fn all_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        (0..self.slots.len()).map(|i| SlotId(i as u8))
    }

    /// Teaching slots in order, excluding breaks.
    pub fn teaching_slots(&self) -> &[SlotId] {
        &self.teaching
    }

    pub fn label(&self, slot: SlotId) -> &str {
        &self.slots[slot.0 as usize].label
    }

    pub fn is_break(&self, slot: SlotId) -> bool {
        self.slots[slot.0 as usize].is_break
    }

    pub fn block(&self, slot: SlotId) -> Option<Block> {
        self.slots[slot.0 as usize].block
    }

    /// `Some(t)` iff `t` immediately follows `slot` in `teaching_slots()` and both
    /// lie in the same contiguous block (no break between). This is the "valid lab
    /// start" test: `consecutive(slot).is_some()`.
    pub fn consecutive(&self, slot: SlotId) -> Option<SlotId> {
        self.consecutive[slot.0 as usize]
    }

    /// Index of `slot` within `teaching_slots()`, used for the earliness/late-slot
    /// objective terms. Panics if `slot` is a break slot (callers only ever index
    /// teaching slots into the objective).
    pub fn teaching_index(&self, slot: SlotId) -> usize {
        self.teaching
            .iter()
            .position(|&s| s == slot)
            .expect("teaching_index called on a break slot")
    }

    pub fn find_by_label(&self, label: &str) -> Option<SlotId> {
        self.slots
            .iter()
            .position(|s| s.label == label)
            .map(|i| SlotId(i as u8))
    }

    /// The slots that open the midday and afternoon blocks, right after the
    /// short mid-morning and lunch breaks. Used for the lecture phase's
    /// post-break-idle penalty; the evening block's opening slot is excluded,
    /// matching the original's `post_break_slots` list.
    pub fn post_break_slots(&self) -> Vec<SlotId> {
        self.teaching
            .iter()
            .copied()
            .filter(|&s| {
                let idx = s.0 as usize;
                idx > 0
                    && self.slots[idx - 1].is_break
                    && matches!(self.block(s), Some(Block::Midday) | Some(Block::Afternoon))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_four_valid_lab_starts() {
        let tm = TimeModel::default_grid();
        let starts: Vec<_> = tm
            .teaching_slots()
            .iter()
            .filter(|&&s| tm.consecutive(s).is_some())
            .map(|&s| tm.label(s).to_string())
            .collect();
        assert_eq!(
            starts,
            vec!["8:15-9:15", "10:30-11:30", "1:15-2:15", "3:30-4:30"]
        );
    }

    #[test]
    fn consecutive_never_crosses_a_break() {
        let tm = TimeModel::default_grid();
        let before_break = tm.find_by_label("9:15-10:15").unwrap();
        assert_eq!(tm.consecutive(before_break), None);
    }

    #[test]
    fn post_break_slots_are_the_first_slot_of_midday_and_afternoon() {
        let tm = TimeModel::default_grid();
        let labels: Vec<_> = tm
            .post_break_slots()
            .iter()
            .map(|&s| tm.label(s).to_string())
            .collect();
        assert_eq!(labels, vec!["10:30-11:30", "1:15-2:15"]);
    }

    #[test]
    fn teaching_index_is_stable_order() {
        let tm = TimeModel::default_grid();
        let first = tm.teaching_slots()[0];
        assert_eq!(tm.teaching_index(first), 0);
    }
}
