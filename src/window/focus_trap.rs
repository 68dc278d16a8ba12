//! Keeps keyboard focus inside the topmost window.
//!
//! Each window is bracketed by two invisible sentinels. Tabbing past the last
//! control lands on the trailing sentinel, which bounces focus to the first
//! control; tabbing backwards past the first lands on the leading sentinel,
//! which bounces to the last. Focus that escapes to an element outside the
//! window is pulled back to the first control. Focus resting on the host body
//! is left alone.

use crate::config::FocusTarget;
use crate::surface::{ElementRef, Focusable, NodeHandle, SentinelEdge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTrap {
    node: NodeHandle,
}

impl FocusTrap {
    pub fn new(node: NodeHandle) -> Self {
        Self { node }
    }

    pub fn leading(&self) -> ElementRef {
        ElementRef::Sentinel(self.node, SentinelEdge::Leading)
    }

    pub fn trailing(&self) -> ElementRef {
        ElementRef::Sentinel(self.node, SentinelEdge::Trailing)
    }

    fn owns(&self, element: &ElementRef, focusables: &[Focusable]) -> bool {
        match element {
            ElementRef::Sentinel(node, _) => *node == self.node,
            ElementRef::Control(node, _) => {
                *node == self.node && focusables.iter().any(|f| &f.element == element)
            }
            _ => false,
        }
    }

    /// Element to focus when the window opens.
    ///
    /// With no target, focus parks on the leading sentinel so the first Tab
    /// reaches the first control. A target that matches nothing yields `None`.
    pub fn initial(&self, target: Option<&FocusTarget>, focusables: &[Focusable]) -> Option<ElementRef> {
        match target {
            None => Some(self.leading()),
            Some(FocusTarget::Index(idx)) => focusables.get(*idx).map(|f| f.element.clone()),
            Some(FocusTarget::Selector(name)) => focusables
                .iter()
                .find(|f| &f.name == name)
                .map(|f| f.element.clone()),
        }
    }

    /// Where focus should move after it landed on `focused`, if anywhere.
    pub fn redirect(&self, focused: Option<&ElementRef>, focusables: &[Focusable]) -> Option<ElementRef> {
        let first = focusables.first().map(|f| f.element.clone());
        match focused {
            None | Some(ElementRef::Body) => None,
            Some(ElementRef::Sentinel(node, SentinelEdge::Trailing)) if *node == self.node => first,
            Some(ElementRef::Sentinel(node, SentinelEdge::Leading)) if *node == self.node => {
                focusables.last().map(|f| f.element.clone())
            }
            Some(element) if self.owns(element, focusables) => None,
            Some(_) => first,
        }
    }

    /// Next stop in document order: leading sentinel, controls, trailing
    /// sentinel. Focus outside the window enters at the matching sentinel.
    pub fn step(&self, focused: Option<&ElementRef>, focusables: &[Focusable], forward: bool) -> ElementRef {
        let mut ring = Vec::with_capacity(focusables.len() + 2);
        ring.push(self.leading());
        ring.extend(focusables.iter().map(|f| f.element.clone()));
        ring.push(self.trailing());

        let position = focused.and_then(|element| ring.iter().position(|stop| stop == element));
        let next = match (position, forward) {
            (Some(pos), true) => (pos + 1).min(ring.len() - 1),
            (Some(pos), false) => pos.saturating_sub(1),
            (None, true) => 0,
            (None, false) => ring.len() - 1,
        };
        ring.swap_remove(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TerminalSurface;
    use crate::surface::RenderSurface;
    use crate::window::WindowId;
    use ratatui::prelude::Rect;

    fn setup(controls: usize) -> (FocusTrap, NodeHandle, Vec<Focusable>) {
        let mut surface = TerminalSurface::new(Rect::new(0, 0, 10, 10));
        let node = surface.create_node(&WindowId::new("w"));
        let focusables = (0..controls)
            .map(|idx| Focusable {
                element: ElementRef::Control(node, idx),
                name: format!("b{idx}"),
            })
            .collect();
        (FocusTrap::new(node), node, focusables)
    }

    #[test]
    fn trailing_sentinel_wraps_to_first() {
        let (trap, node, focusables) = setup(3);
        let got = trap.redirect(Some(&trap.trailing()), &focusables);
        assert_eq!(got, Some(ElementRef::Control(node, 0)));
    }

    #[test]
    fn leading_sentinel_wraps_to_last() {
        let (trap, node, focusables) = setup(3);
        let got = trap.redirect(Some(&trap.leading()), &focusables);
        assert_eq!(got, Some(ElementRef::Control(node, 2)));
    }

    #[test]
    fn outside_focus_is_pulled_back_but_body_is_not() {
        let (trap, node, focusables) = setup(2);
        assert_eq!(
            trap.redirect(Some(&ElementRef::External(7)), &focusables),
            Some(ElementRef::Control(node, 0))
        );
        assert_eq!(trap.redirect(Some(&ElementRef::Body), &focusables), None);
        assert_eq!(
            trap.redirect(Some(&ElementRef::Control(node, 1)), &focusables),
            None
        );
    }

    #[test]
    fn tab_cycles_through_sentinels() {
        let (trap, node, focusables) = setup(2);
        let last = ElementRef::Control(node, 1);
        let stop = trap.step(Some(&last), &focusables, true);
        assert_eq!(stop, trap.trailing());
        assert_eq!(
            trap.redirect(Some(&stop), &focusables),
            Some(ElementRef::Control(node, 0))
        );

        let first = ElementRef::Control(node, 0);
        let stop = trap.step(Some(&first), &focusables, false);
        assert_eq!(stop, trap.leading());
        assert_eq!(trap.redirect(Some(&stop), &focusables), Some(last));
    }

    #[test]
    fn initial_focus_resolves_targets() {
        let (trap, node, focusables) = setup(3);
        assert_eq!(trap.initial(None, &focusables), Some(trap.leading()));
        assert_eq!(
            trap.initial(Some(&FocusTarget::Index(2)), &focusables),
            Some(ElementRef::Control(node, 2))
        );
        assert_eq!(
            trap.initial(Some(&FocusTarget::Selector("b1".into())), &focusables),
            Some(ElementRef::Control(node, 1))
        );
        assert_eq!(trap.initial(Some(&FocusTarget::Index(9)), &focusables), None);
    }
}
