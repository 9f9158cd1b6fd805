//! Numeric keypad sub-dialog.
//!
//! A 3x3 digit grid plus `0`/delete/done/cancel/reset/(max) controls, used
//! as a sub-dialog wherever a flow needs one exact integer from the user
//! (the pagination jump). The dialog manages its own lifecycle: it sends
//! its message on open and deletes it on either terminal button.

use crate::dialog::builder::MessageBuilder;
use crate::dialog::manager::MessageManager;
use crate::dialog::payload::{ActionRow, Button, ButtonStyle, Embed};
use crate::dialog::surface::ChatSurface;
use crate::errors::Result;
use futures::StreamExt;
use std::sync::Arc;
use tracing::instrument;

const DIGIT_PREFIX: &str = "keypad:digit:";
const DELETE_ID: &str = "keypad:delete";
const DONE_ID: &str = "keypad:done";
const CANCEL_ID: &str = "keypad:cancel";
const RESET_ID: &str = "keypad:reset";
const MAX_ID: &str = "keypad:max";

/// Optional inclusive bounds on the amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypadBounds {
    /// Smallest acceptable amount.
    pub min: Option<i64>,
    /// Largest acceptable amount; also enables the max shortcut button.
    pub max: Option<i64>,
}

/// The keypad dialog. `amount` accumulates decimal digits left to right;
/// the displayed amount and the internal one are always consistent after
/// any click resolves (render after mutate, never stale).
pub struct KeypadMessageManager {
    manager: MessageManager,
    title: String,
    amount: i64,
    bounds: KeypadBounds,
}

impl KeypadMessageManager {
    /// Sends the keypad message and returns the dialog ready to run.
    pub async fn open(
        surface: Arc<dyn ChatSurface>,
        title: &str,
        bounds: KeypadBounds,
    ) -> Result<Self> {
        let amount = initial_amount(bounds);
        let manager = MessageBuilder::new()
            .embed(render_embed(title, amount))
            .components(rows(bounds))
            .send(surface)
            .await?;
        Ok(Self {
            manager,
            title: title.to_string(),
            amount,
            bounds,
        })
    }

    /// Current amount.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Runs the dialog until done or cancel. Returns the final amount, or
    /// `None` when cancelled (or the click stream closed).
    #[instrument(skip(self), fields(title = %self.title))]
    pub async fn run(mut self) -> Result<Option<i64>> {
        let surface = self.manager.surface();
        let mut clicks = surface.component_clicks(self.manager.message_id());

        while let Some(click) = clicks.next().await {
            let id = click.custom_id.as_str();
            if let Some(digit) = id.strip_prefix(DIGIT_PREFIX).and_then(|d| d.parse::<i64>().ok()) {
                self.try_set(self.amount * 10 + digit, &surface).await?;
            } else {
                match id {
                    DELETE_ID => {
                        // Floor division, so negative amounts shrink
                        // toward the minimum rather than jumping past 0.
                        self.try_set(self.amount.div_euclid(10), &surface).await?;
                    }
                    RESET_ID => {
                        self.amount = initial_amount(self.bounds);
                    }
                    MAX_ID => {
                        if let Some(max) = self.bounds.max {
                            self.amount = max;
                        }
                    }
                    DONE_ID => {
                        if let Some(min) = self.bounds.min {
                            if self.amount < min {
                                surface
                                    .notify(&format!("The amount must be at least {min}."))
                                    .await?;
                                self.render().await?;
                                continue;
                            }
                        }
                        let amount = self.amount;
                        self.manager.remove().await?;
                        return Ok(Some(amount));
                    }
                    CANCEL_ID => {
                        self.manager.remove().await?;
                        return Ok(None);
                    }
                    _ => {}
                }
            }
            // The embed always reflects the current amount, accepted or not.
            self.render().await?;
        }
        self.manager.remove().await?;
        Ok(None)
    }

    /// Applies a candidate amount if it stays within bounds; otherwise
    /// leaves the amount unchanged and posts a transient error.
    async fn try_set(&mut self, candidate: i64, surface: &Arc<dyn ChatSurface>) -> Result<()> {
        if let Some(max) = self.bounds.max {
            if candidate > max {
                surface
                    .notify(&format!("The amount must be at most {max}."))
                    .await?;
                return Ok(());
            }
        }
        if let Some(min) = self.bounds.min {
            if candidate < min {
                surface
                    .notify(&format!("The amount must be at least {min}."))
                    .await?;
                return Ok(());
            }
        }
        self.amount = candidate;
        Ok(())
    }

    async fn render(&mut self) -> Result<()> {
        self.manager.data_mut().embeds = vec![render_embed(&self.title, self.amount)];
        self.manager.update().await
    }
}

fn initial_amount(bounds: KeypadBounds) -> i64 {
    bounds.min.map_or(0, |min| min.min(0))
}

fn render_embed(title: &str, amount: i64) -> Embed {
    Embed::new().title(title).description(format!("`{amount}`"))
}

fn digit_button(digit: i64) -> Button {
    Button::new(format!("{DIGIT_PREFIX}{digit}"), digit.to_string()).style(ButtonStyle::Secondary)
}

fn rows(bounds: KeypadBounds) -> Vec<ActionRow> {
    let mut controls = vec![
        Button::new(DONE_ID, "Done").style(ButtonStyle::Success),
        Button::new(CANCEL_ID, "Cancel").style(ButtonStyle::Danger),
        Button::new(RESET_ID, "Reset").style(ButtonStyle::Secondary),
    ];
    if bounds.max.is_some() {
        controls.push(Button::new(MAX_ID, "Max"));
    }
    vec![
        ActionRow::buttons(vec![digit_button(1), digit_button(2), digit_button(3)]),
        ActionRow::buttons(vec![digit_button(4), digit_button(5), digit_button(6)]),
        ActionRow::buttons(vec![digit_button(7), digit_button(8), digit_button(9)]),
        ActionRow::buttons(vec![
            Button::new(DELETE_ID, "\u{232b}").style(ButtonStyle::Secondary),
            digit_button(0),
        ]),
        ActionRow::buttons(controls),
    ]
}
