//! Garden canvas interaction model.
//!
//! # Responsibility
//! - Own the working set of placed elements while a garden is being edited.
//! - Apply drag, rotate and selection gestures.
//!
//! # Invariants
//! - After a drag release every element satisfies
//!   `0 <= x <= width - 50` and `0 <= y <= height - 50`.
//! - At most one element is selected.
//! - Ripples are cosmetic and never touch element data.

use crate::model::garden::{derive_thumbnail, CatalogElement, ElementKind, PlacedElement, Position};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rendered footprint of one element, in pixels.
pub const ELEMENT_EXTENT: f64 = 50.0;
/// Rotation applied per double click, in degrees.
pub const ROTATION_STEP_DEGREES: f64 = 45.0;
/// How long a ripple marker stays visible.
pub const RIPPLE_LIFETIME_MS: i64 = 600;
const RIPPLE_OFFSET: f64 = ELEMENT_EXTENT / 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasError {
    ElementOutOfRange { index: usize, len: usize },
}

impl Display for CanvasError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElementOutOfRange { index, len } => {
                write!(f, "element index {index} out of range for {len} elements")
            }
        }
    }
}

impl Error for CanvasError {}

/// Transient water ripple marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Ripple {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub expires_at_ms: i64,
}

/// Result of releasing a dragged element.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcome {
    pub position: Position,
    pub ripple: Option<Ripple>,
}

/// Editable canvas holding placed elements.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: f64,
    height: f64,
    elements: Vec<PlacedElement>,
    selected: Option<usize>,
    ripples: Vec<Ripple>,
    next_ripple_id: u64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
            selected: None,
            ripples: Vec::new(),
            next_ripple_id: 1,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn elements(&self) -> &[PlacedElement] {
        &self.elements
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&PlacedElement> {
        self.selected.and_then(|index| self.elements.get(index))
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    /// Replaces the whole working set, e.g. after loading a garden.
    pub fn replace_elements(&mut self, elements: Vec<PlacedElement>) {
        self.elements = elements;
        self.selected = None;
        self.ripples.clear();
    }

    /// Drops a catalog element onto the canvas. Returns its index.
    pub fn add_element(&mut self, catalog: &CatalogElement, position: Position) -> usize {
        self.elements
            .push(PlacedElement::from_catalog(catalog, position));
        self.elements.len() - 1
    }

    /// Moves element `index` by the pointer displacement since drag start.
    ///
    /// Water elements leave a ripple centered on the element.
    pub fn drag_release(
        &mut self,
        index: usize,
        dx: f64,
        dy: f64,
        now_ms: i64,
    ) -> Result<DragOutcome, CanvasError> {
        let max_x = self.width - ELEMENT_EXTENT;
        let max_y = self.height - ELEMENT_EXTENT;
        let len = self.elements.len();
        let element = self
            .elements
            .get_mut(index)
            .ok_or(CanvasError::ElementOutOfRange { index, len })?;

        let position = Position::new(
            clamp_axis(element.position.x + dx, max_x),
            clamp_axis(element.position.y + dy, max_y),
        );
        element.position = position;

        let ripple = if element.kind == ElementKind::Water {
            let ripple = Ripple {
                id: self.next_ripple_id,
                x: position.x + RIPPLE_OFFSET,
                y: position.y + RIPPLE_OFFSET,
                expires_at_ms: now_ms + RIPPLE_LIFETIME_MS,
            };
            self.next_ripple_id += 1;
            self.ripples.push(ripple.clone());
            Some(ripple)
        } else {
            None
        };

        Ok(DragOutcome { position, ripple })
    }

    /// Removes ripples whose lifetime has elapsed.
    pub fn expire_ripples(&mut self, now_ms: i64) {
        self.ripples.retain(|ripple| ripple.expires_at_ms > now_ms);
    }

    /// Rotates element `index` by one step. Returns the new rotation.
    pub fn rotate(&mut self, index: usize) -> Result<f64, CanvasError> {
        let len = self.elements.len();
        let element = self
            .elements
            .get_mut(index)
            .ok_or(CanvasError::ElementOutOfRange { index, len })?;
        element.rotation += ROTATION_STEP_DEGREES;
        Ok(element.rotation)
    }

    pub fn select(&mut self, index: usize) -> Result<(), CanvasError> {
        if index >= self.elements.len() {
            return Err(CanvasError::ElementOutOfRange {
                index,
                len: self.elements.len(),
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Click on empty canvas area.
    pub fn click_empty(&mut self) {
        self.selected = None;
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.selected = None;
        self.ripples.clear();
    }

    pub fn thumbnail(&self) -> &'static str {
        derive_thumbnail(&self.elements)
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_elements;

    fn catalog(kind: ElementKind) -> CatalogElement {
        builtin_elements()
            .into_iter()
            .find(|element| element.kind == kind)
            .unwrap()
    }

    #[test]
    fn drag_release_clamps_to_canvas_bounds() {
        let mut canvas = Canvas::new(800.0, 600.0);
        let index = canvas.add_element(&catalog(ElementKind::Rock), Position::new(100.0, 100.0));

        let outcome = canvas.drag_release(index, 5_000.0, -5_000.0, 0).unwrap();
        assert_eq!(outcome.position, Position::new(750.0, 0.0));
        assert!(outcome.ripple.is_none());

        let outcome = canvas.drag_release(index, -10_000.0, 10_000.0, 0).unwrap();
        assert_eq!(outcome.position, Position::new(0.0, 550.0));

        let outcome = canvas.drag_release(index, 120.5, 40.25, 0).unwrap();
        assert_eq!(outcome.position, Position::new(120.5, 550.0));
    }

    #[test]
    fn drag_results_stay_in_bounds_for_many_displacements() {
        let mut canvas = Canvas::new(640.0, 480.0);
        let index = canvas.add_element(&catalog(ElementKind::Plant), Position::new(300.0, 200.0));
        for step in -40..40 {
            let delta = f64::from(step) * 37.5;
            let outcome = canvas.drag_release(index, delta, -delta * 1.3, 0).unwrap();
            assert!((0.0..=590.0).contains(&outcome.position.x));
            assert!((0.0..=430.0).contains(&outcome.position.y));
        }
    }

    #[test]
    fn water_drag_leaves_expiring_ripple() {
        let mut canvas = Canvas::new(800.0, 600.0);
        let index = canvas.add_element(&catalog(ElementKind::Water), Position::new(10.0, 20.0));

        let outcome = canvas.drag_release(index, 30.0, 30.0, 1_000).unwrap();
        let ripple = outcome.ripple.expect("water elements ripple");
        assert_eq!((ripple.x, ripple.y), (65.0, 75.0));
        assert_eq!(canvas.ripples().len(), 1);

        canvas.expire_ripples(1_599);
        assert_eq!(canvas.ripples().len(), 1);
        canvas.expire_ripples(1_600);
        assert!(canvas.ripples().is_empty());
        assert_eq!(canvas.elements()[0].position, Position::new(40.0, 50.0));
    }

    #[test]
    fn rotation_accumulates_without_wrapping() {
        let mut canvas = Canvas::new(800.0, 600.0);
        let index = canvas.add_element(&catalog(ElementKind::Rock), Position::default());
        for _ in 0..9 {
            canvas.rotate(index).unwrap();
        }
        assert_eq!(canvas.elements()[0].rotation, 405.0);
    }

    #[test]
    fn selection_is_single_and_cleared_by_empty_click() {
        let mut canvas = Canvas::new(800.0, 600.0);
        canvas.add_element(&catalog(ElementKind::Rock), Position::default());
        canvas.add_element(&catalog(ElementKind::Plant), Position::default());

        canvas.select(0).unwrap();
        canvas.select(1).unwrap();
        assert_eq!(canvas.selected(), Some(1));
        assert_eq!(canvas.selected_element().unwrap().kind, ElementKind::Plant);

        canvas.click_empty();
        assert_eq!(canvas.selected(), None);
        assert_eq!(
            canvas.select(5),
            Err(CanvasError::ElementOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn clear_empties_elements_and_selection() {
        let mut canvas = Canvas::new(800.0, 600.0);
        canvas.add_element(&catalog(ElementKind::Rock), Position::default());
        canvas.select(0).unwrap();
        canvas.clear();
        assert!(canvas.elements().is_empty());
        assert_eq!(canvas.selected(), None);
        assert_eq!(canvas.thumbnail(), "🌱");
    }
}
