//! Presentation handlers: fullscreen mode, tab-strip scrolling and theme
//! propagation to embedded documents

use tabshell_core::markup::{ATTR_WIDGET, CLASS_FULLSCREEN_MODE};
use tabshell_core::prelude::*;
use tabshell_core::Widget;

use crate::message::{ScrollDirection, ThemeModeMessage};
use crate::state::ShellState;

use super::{UpdateAction, UpdateResult};

/// Flip the body-level fullscreen mode and swap the widget's icon classes
pub fn toggle_fullscreen(state: &mut ShellState) -> UpdateResult {
    let doc = &mut state.document;
    let body = doc.body();
    state.fullscreen = doc.toggle_class(body, CLASS_FULLSCREEN_MODE);

    let icon = doc
        .find(body, |el| {
            el.attr(ATTR_WIDGET) == Some(Widget::Fullscreen.as_attr())
        })
        .and_then(|widget| doc.find(widget, |el| el.is("i")));

    if let Some(icon) = icon {
        let classes = format!(
            "{} {}",
            state.settings.icon_maximize, state.settings.icon_minimize
        );
        for class in classes.split_whitespace() {
            doc.toggle_class(icon, class);
        }
    }

    debug!("Fullscreen {}", if state.fullscreen { "on" } else { "off" });
    UpdateResult::none()
}

/// Move the tab strip one step; `scroll_behavior_swap` reverses directions
pub fn scroll(state: &mut ShellState, direction: ScrollDirection) -> UpdateResult {
    let Some(strip) = state.layout.as_ref().map(|layout| layout.tab_strip) else {
        return UpdateResult::none();
    };

    let step = f64::from(state.settings.scroll_offset);
    let delta = match (direction, state.settings.scroll_behavior_swap) {
        (ScrollDirection::Left, false) | (ScrollDirection::Right, true) => -step,
        (ScrollDirection::Right, false) | (ScrollDirection::Left, true) => step,
    };

    let current = state.document.scroll_left(strip);
    state.document.set_scroll_left(strip, current + delta);
    trace!(
        "Scrolled tab strip {:?} to {}",
        direction,
        state.document.scroll_left(strip)
    );
    UpdateResult::none()
}

/// Remember the colour scheme and, with `auto_dark_mode`, post it to every
/// open tab's frame
pub fn propagate_theme_mode(state: &mut ShellState, dark: bool) -> UpdateResult {
    state.dark_mode = Some(dark);

    if !state.settings.auto_dark_mode {
        return UpdateResult::none();
    }

    let message = ThemeModeMessage {
        auto_dark_mode: dark,
    };
    let actions: Vec<UpdateAction> = state
        .registry
        .all()
        .map(|entry| UpdateAction::PostMessage {
            frame: entry.frame,
            message,
        })
        .collect();

    debug!("Posting dark={} to {} frames", dark, actions.len());
    UpdateResult {
        message: None,
        actions,
    }
}
