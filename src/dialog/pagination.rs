//! Paged message browser.
//!
//! Wraps a [`MessageManager`] with page state, a navigation button row and
//! a change queue. Composition per the engine's design: the caller hands
//! in a render strategy (a closure refreshing the page-dependent payload)
//! and drains an explicit change queue instead of subscribing to a
//! generic event emitter.

use crate::dialog::keypad::{KeypadBounds, KeypadMessageManager};
use crate::dialog::manager::MessageManager;
use crate::dialog::payload::{ActionRow, Button, ButtonStyle, MessageData};
use crate::errors::Result;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Custom-id prefix shared by all navigation buttons.
pub const NAV_PREFIX: &str = "page:";
const BACK_TEN_ID: &str = "page:back10";
const BACK_ID: &str = "page:back";
const JUMP_ID: &str = "page:jump";
const FORWARD_ID: &str = "page:fwd";
const FORWARD_TEN_ID: &str = "page:fwd10";

/// Refreshes the page-dependent parts of the payload for a given page.
pub type RenderPage = Box<dyn Fn(&mut MessageData, usize) + Send + Sync>;

/// A paged message with `current_page` in `[0, size-1]`.
///
/// Every successful page write re-renders the payload, edits the live
/// message, and then pushes the new page onto the change queue, in that
/// order, so a consumer draining the queue can safely read page-dependent
/// state. Out-of-bounds writes change nothing and push nothing.
pub struct PaginationMessageManager {
    manager: MessageManager,
    current_page: usize,
    size: usize,
    render: RenderPage,
    changes: mpsc::UnboundedSender<usize>,
}

impl PaginationMessageManager {
    /// Wraps a sent message in pagination state. `size` is clamped to at
    /// least 1; `size == 1` is the valid degenerate "no navigation
    /// needed" state. Returns the manager and the change queue receiver.
    pub fn new(
        manager: MessageManager,
        size: usize,
        render: RenderPage,
    ) -> (Self, mpsc::UnboundedReceiver<usize>) {
        let (changes, receiver) = mpsc::unbounded_channel();
        (
            Self {
                manager,
                current_page: 0,
                size: size.max(1),
                render,
                changes,
            },
            receiver,
        )
    }

    /// Current page, zero-based.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Total page count.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Renders page 0 and the navigation row onto the live message.
    pub async fn start(&mut self) -> Result<()> {
        self.apply(0).await
    }

    /// Writes `page`, returning whether it was in bounds. In-bounds writes
    /// always re-render, edit, and emit one change, even when the page is
    /// unchanged.
    pub async fn set_page(&mut self, page: usize) -> Result<bool> {
        if page >= self.size {
            debug!("Rejecting out-of-bounds page {} of {}", page, self.size);
            return Ok(false);
        }
        self.apply(page).await?;
        let _ = self.changes.send(page);
        Ok(true)
    }

    /// Steps relative to the current page; no wraparound.
    pub async fn step(&mut self, delta: isize) -> Result<bool> {
        let Some(target) = self.current_page.checked_add_signed(delta) else {
            return Ok(false);
        };
        self.set_page(target).await
    }

    async fn apply(&mut self, page: usize) -> Result<()> {
        self.current_page = page;
        (self.render)(self.manager.data_mut(), page);
        let row = nav_row(page, self.size);
        self.manager.data_mut().upsert_row(NAV_PREFIX, row);
        self.manager.update().await
    }

    /// Drives the navigation click loop until the click stream closes.
    /// Button handling is serialized: each click is fully applied before
    /// the next is read.
    #[instrument(skip(self), fields(size = self.size))]
    pub async fn run(mut self) -> Result<()> {
        self.start().await?;
        let surface = self.manager.surface();
        let mut clicks = surface.component_clicks(self.manager.message_id());

        while let Some(click) = clicks.next().await {
            match click.custom_id.as_str() {
                BACK_TEN_ID => {
                    self.step(-10).await?;
                }
                BACK_ID => {
                    self.step(-1).await?;
                }
                FORWARD_ID => {
                    self.step(1).await?;
                }
                FORWARD_TEN_ID => {
                    self.step(10).await?;
                }
                JUMP_ID => {
                    self.jump().await?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Opens the keypad sub-dialog and jumps to the entered page. The
    /// keypad owns its own message and deletes it itself; this manager
    /// only supplies the completion handling.
    async fn jump(&mut self) -> Result<()> {
        if self.size == 1 {
            return Ok(());
        }
        let keypad = KeypadMessageManager::open(
            self.manager.surface(),
            "Jump to page",
            KeypadBounds {
                min: Some(1),
                max: Some(self.size as i64),
            },
        )
        .await?;
        if let Some(entered) = keypad.run().await? {
            // Keypad speaks one-based pages.
            let _ = self.set_page((entered - 1) as usize).await?;
        }
        Ok(())
    }
}

/// Builds the five-button navigation row for a page/size pair. A zero
/// size is treated as the degenerate single page.
#[must_use]
pub fn nav_row(page: usize, size: usize) -> ActionRow {
    let size = size.max(1);
    let last = size - 1;
    ActionRow::buttons(vec![
        Button::new(BACK_TEN_ID, "\u{ab}")
            .style(ButtonStyle::Secondary)
            .disabled(page < 10),
        Button::new(BACK_ID, "\u{2039}")
            .style(ButtonStyle::Secondary)
            .disabled(page == 0),
        Button::new(JUMP_ID, format!("{} / {}", page + 1, size)).disabled(size == 1),
        Button::new(FORWARD_ID, "\u{203a}")
            .style(ButtonStyle::Secondary)
            .disabled(page == last),
        Button::new(FORWARD_TEN_ID, "\u{bb}")
            .style(ButtonStyle::Secondary)
            .disabled(page + 10 > last),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::builder::MessageBuilder;
    use crate::dialog::payload::Embed;
    use crate::dialog::surface::{ChatSurface, MessageId, UserId};
    use crate::test_utils::{FakeSurface, drain, wait_until};
    use std::sync::Arc;

    const USER: UserId = UserId(9);

    fn page_render() -> RenderPage {
        Box::new(|data, page| {
            data.embeds = vec![Embed::new().title(format!("Page {}", page + 1))];
        })
    }

    async fn paged(
        surface: &Arc<FakeSurface>,
        size: usize,
    ) -> (
        PaginationMessageManager,
        mpsc::UnboundedReceiver<usize>,
        MessageId,
    ) {
        let manager = MessageBuilder::new()
            .send(Arc::clone(surface) as Arc<dyn ChatSurface>)
            .await
            .unwrap();
        let id = manager.message_id();
        let (pager, changes) = PaginationMessageManager::new(manager, size, page_render());
        (pager, changes, id)
    }

    #[tokio::test]
    async fn out_of_bounds_writes_change_nothing_and_emit_nothing() {
        let surface = FakeSurface::shared();
        let (mut pager, mut changes, _id) = paged(&surface, 5).await;
        pager.start().await.unwrap();

        assert!(!pager.set_page(5).await.unwrap());
        assert!(!pager.step(-1).await.unwrap());
        assert_eq!(pager.current_page(), 0);
        assert!(drain(&mut changes).is_empty());
    }

    #[tokio::test]
    async fn each_transition_renders_then_emits_exactly_once() {
        let surface = FakeSurface::shared();
        let (mut pager, mut changes, id) = paged(&surface, 30).await;
        pager.start().await.unwrap();

        assert!(pager.set_page(3).await.unwrap());
        assert!(pager.step(10).await.unwrap());
        assert!(pager.step(-1).await.unwrap());
        assert_eq!(drain(&mut changes), vec![3, 13, 12]);

        let data = surface.message_data(id).unwrap();
        assert_eq!(data.embeds[0].title.as_deref(), Some("Page 13"));
        let nav = &data.components[0];
        assert_eq!(nav.buttons[2].label, "13 / 30");
    }

    #[tokio::test]
    async fn nav_row_disables_targets_outside_bounds() {
        let row = nav_row(0, 30);
        assert!(row.buttons[0].disabled); // -10
        assert!(row.buttons[1].disabled); // -1
        assert!(!row.buttons[2].disabled); // jump
        assert!(!row.buttons[3].disabled); // +1
        assert!(!row.buttons[4].disabled); // +10

        let row = nav_row(29, 30);
        assert!(!row.buttons[0].disabled);
        assert!(!row.buttons[1].disabled);
        assert!(row.buttons[3].disabled);
        assert!(row.buttons[4].disabled);

        let row = nav_row(25, 30);
        assert!(row.buttons[4].disabled); // 35 would overshoot
        assert!(!row.buttons[0].disabled);
    }

    #[tokio::test]
    async fn degenerate_single_page_disables_all_navigation() {
        let row = nav_row(0, 1);
        for button in &row.buttons {
            assert!(button.disabled, "{} should be disabled", button.custom_id);
        }
        assert_eq!(row.buttons[2].label, "1 / 1");
    }

    #[tokio::test]
    async fn zero_size_row_renders_as_a_single_page() {
        let row = nav_row(0, 0);
        for button in &row.buttons {
            assert!(button.disabled, "{} should be disabled", button.custom_id);
        }
        assert_eq!(row.buttons[2].label, "1 / 1");
    }

    #[tokio::test]
    async fn click_loop_steps_and_ignores_disabled_directions() {
        let surface = FakeSurface::shared();
        let (pager, mut changes, id) = paged(&surface, 3).await;
        let task = tokio::spawn(pager.run());

        // Backwards from page 0 is out of bounds and emits nothing.
        surface.push_click(id, BACK_ID, USER);
        surface.push_click(id, FORWARD_ID, USER);
        surface.push_click(id, FORWARD_ID, USER);
        wait_until("page 3 rendered", || {
            surface
                .message_data(id)
                .is_some_and(|d| d.embeds.first().is_some_and(|e| e.title.as_deref() == Some("Page 3")))
        })
        .await;
        assert_eq!(drain(&mut changes), vec![1, 2]);
        task.abort();
    }

    #[tokio::test]
    async fn jump_button_opens_keypad_and_applies_the_entered_page() {
        let surface = FakeSurface::shared();
        let (pager, mut changes, id) = paged(&surface, 40).await;
        let task = tokio::spawn(pager.run());

        surface.push_click(id, JUMP_ID, USER);
        let keypad_id = crate::test_utils::wait_for_sent(&surface, "keypad message", |data| {
            data.embeds
                .iter()
                .any(|e| e.title.as_deref() == Some("Jump to page"))
        })
        .await;

        surface.push_click(keypad_id, "keypad:digit:2", USER);
        surface.push_click(keypad_id, "keypad:digit:7", USER);
        surface.push_click(keypad_id, "keypad:done", USER);

        wait_until("page 27 rendered", || {
            surface
                .message_data(id)
                .is_some_and(|d| d.embeds.first().is_some_and(|e| e.title.as_deref() == Some("Page 27")))
        })
        .await;
        assert!(surface.was_deleted(keypad_id));
        assert_eq!(drain(&mut changes), vec![26]);
        task.abort();
    }
}
