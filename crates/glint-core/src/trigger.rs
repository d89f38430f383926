//! Maps batches of host-page mutations onto "row selected" events.

use glint_platform::{MutationKind, MutationRecord, PageHost};
use tracing::trace;

use crate::chord::Intent;

pub struct MutationTrigger {
    selection_attribute: String,
}

impl MutationTrigger {
    pub fn new(selection_attribute: impl Into<String>) -> Self {
        Self {
            selection_attribute: selection_attribute.into(),
        }
    }

    /// Returns the first row in `batch` that just became selected, provided
    /// the current intent is a selection. At most one row per batch.
    pub fn selected_row<H: PageHost>(
        &self,
        host: &H,
        batch: &[MutationRecord<H::Element>],
        intent: Intent,
    ) -> Option<H::Element> {
        if !intent.is_selection() {
            return None;
        }
        batch
            .iter()
            .filter(|m| m.kind == MutationKind::Attributes)
            .filter(|m| m.attribute.as_deref() == Some(self.selection_attribute.as_str()))
            .find_map(|m| {
                let Some(row) = host.enclosing_row(&m.target) else {
                    trace!(target_node = ?m.target, "mutation outside any row");
                    return None;
                };
                (host.is_list_row(&row) && host.is_row_selected(&row)).then_some(row)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{PageNode, ScriptedPage};
    use glint_platform::{ElementRect, Viewport};

    fn page(rows: usize) -> ScriptedPage {
        let mut page = ScriptedPage::new(Viewport::default());
        for i in 0..rows {
            page.add_row(ElementRect {
                x: 0.0,
                y: i as f32 * 40.0,
                width: 600.0,
                height: 40.0,
            });
        }
        page
    }

    #[test]
    fn first_selected_row_wins() {
        let mut page = page(3);
        let batch = vec![
            page.set_selected(0, false),
            page.set_selected(1, true),
            page.set_selected(2, true),
        ];
        let trigger = MutationTrigger::new("aria-checked");
        let row = trigger.selected_row(&page, &batch, Intent::SelectAll);
        assert_eq!(row, Some(PageNode::Row(1)));
    }

    #[test]
    fn non_selection_intent_is_ignored() {
        let mut page = page(1);
        let batch = vec![page.set_selected(0, true)];
        let trigger = MutationTrigger::new("aria-checked");
        for intent in [Intent::None, Intent::Archive, Intent::MarkAsRead] {
            assert_eq!(trigger.selected_row(&page, &batch, intent), None);
        }
        assert!(trigger.selected_row(&page, &batch, Intent::SelectOne).is_some());
    }

    #[test]
    fn other_attributes_are_ignored() {
        let mut page = page(1);
        let mut record = page.set_selected(0, true);
        record.attribute = Some("class".into());
        let trigger = MutationTrigger::new("aria-checked");
        assert_eq!(trigger.selected_row(&page, &[record], Intent::SelectOne), None);
    }

    #[test]
    fn unresolvable_targets_are_skipped() {
        let mut page = page(2);
        let foreign = page.add_foreign_row(ElementRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        page.set_selected(1, true);
        page.detach(1);
        let batch = vec![
            MutationRecord {
                target: PageNode::Detached,
                kind: MutationKind::Attributes,
                attribute: Some("aria-checked".into()),
            },
            page.set_selected(foreign, true),
            page.set_selected(1, true),
            page.set_selected(0, true),
        ];
        let trigger = MutationTrigger::new("aria-checked");
        assert_eq!(
            trigger.selected_row(&page, &batch, Intent::SelectOne),
            Some(PageNode::Row(0))
        );
    }
}
