use proptest::prelude::*;
use solekit_core::{FootSide, Point, ShoeSize};
use solekit_designer::hit_test::rotate_handle_position;
use solekit_designer::interaction::resize_piece;
use solekit_designer::{
    catalog, svg_scale, Corner, DimensionStore, DragState, EditorEvent, EditorState,
    InteractionController, Key, Modifiers, PiecePosition, Transition, MIN_PIECE_SIZE,
};
use solekit_settings::EditorSettings;

fn piece(id: &str, x: f64, y: f64, rotation: f64) -> PiecePosition {
    PiecePosition {
        id: id.to_string(),
        x,
        y,
        width: 100.0,
        height: 50.0,
        rotation,
    }
}

fn controller_with_selected(rotation: f64) -> InteractionController {
    let mut state = EditorState::new(ShoeSize::default(), FootSide::Left);
    state
        .geometry
        .place(piece("heel_lift", 200.0, 300.0, rotation))
        .expect("place");
    state.selection = Some("heel_lift".to_string());
    InteractionController::new(state, EditorSettings::default())
}

fn down(x: f64, y: f64) -> EditorEvent {
    EditorEvent::PointerDown {
        at: Point::new(x, y),
        modifiers: Modifiers::default(),
    }
}

fn moved(x: f64, y: f64, aspect_lock: bool) -> EditorEvent {
    EditorEvent::PointerMove {
        at: Point::new(x, y),
        modifiers: Modifiers { aspect_lock },
    }
}

fn rotation_of(controller: &InteractionController) -> f64 {
    controller
        .state()
        .geometry
        .piece("heel_lift")
        .map(|p| p.rotation)
        .expect("piece")
}

#[test]
fn arrow_keys_nudge_selected_piece() {
    let mut c = controller_with_selected(10.0);
    assert_eq!(c.dispatch(EditorEvent::Key(Key::ArrowRight)), Transition::Changed);
    assert_eq!(rotation_of(&c), 15.0);

    c.dispatch(EditorEvent::Key(Key::ArrowLeft));
    c.dispatch(EditorEvent::Key(Key::ArrowLeft));
    assert_eq!(rotation_of(&c), 5.0);
}

#[test]
fn nudge_ignored_while_dragging() {
    let mut c = controller_with_selected(10.0);
    assert_eq!(c.dispatch(down(200.0, 300.0)), Transition::Changed);
    assert!(c.state().is_dragging());
    assert_eq!(c.dispatch(EditorEvent::Key(Key::ArrowRight)), Transition::Noop);
    assert_eq!(rotation_of(&c), 10.0);
}

#[test]
fn nudge_without_selection_is_noop() {
    let mut c = controller_with_selected(10.0);
    c.state_mut().selection = None;
    assert_eq!(c.dispatch(EditorEvent::Key(Key::ArrowRight)), Transition::Noop);
}

#[test]
fn move_keeps_grab_offset() {
    let mut c = controller_with_selected(0.0);
    c.dispatch(down(210.0, 305.0));
    c.dispatch(moved(260.0, 355.0, false));
    c.dispatch(EditorEvent::PointerUp);

    let p = c.state().geometry.piece("heel_lift").expect("piece");
    assert_eq!((p.x, p.y), (250.0, 350.0));
    assert_eq!(c.state().drag, DragState::Idle);
}

#[test]
fn pointer_leave_ends_drag() {
    let mut c = controller_with_selected(0.0);
    c.dispatch(down(210.0, 305.0));
    assert_eq!(c.dispatch(EditorEvent::PointerLeave), Transition::Changed);
    assert!(!c.state().is_dragging());
    assert_eq!(c.dispatch(moved(400.0, 400.0, false)), Transition::Noop);
}

#[test]
fn rotate_handle_points_piece_at_pointer() {
    let mut c = controller_with_selected(0.0);
    let settings = EditorSettings::default();
    let handle = {
        let p = c.state().geometry.piece("heel_lift").expect("piece");
        rotate_handle_position(p, settings.rotate_handle_offset)
    };
    c.dispatch(down(handle.x, handle.y));
    c.dispatch(moved(300.0, 300.0, false));
    assert!((rotation_of(&c) - 90.0).abs() < 1e-9);

    // Pointer on the center: no defined angle, nothing changes.
    assert_eq!(c.dispatch(moved(200.0, 300.0, false)), Transition::Noop);
    assert!((rotation_of(&c) - 90.0).abs() < 1e-9);
}

#[test]
fn locked_resize_through_controller() {
    let mut c = controller_with_selected(0.0);
    c.dispatch(down(250.0, 325.0));
    c.dispatch(moved(300.0, 310.0, true));
    let p = c.state().geometry.piece("heel_lift").expect("piece");
    assert!((p.width - 200.0).abs() < 1e-9);
    assert!((p.height - 100.0).abs() < 1e-9);
}

#[test]
fn resize_never_goes_below_piece_floor() {
    let loose = EditorSettings {
        min_piece_size: 5.0,
        ..EditorSettings::default()
    };
    let mut c = InteractionController::new(controller_with_selected(0.0).into_state(), loose);
    c.dispatch(down(250.0, 325.0));
    c.dispatch(moved(201.0, 301.0, false));
    let p = c.state().geometry.piece("heel_lift").expect("piece");
    assert_eq!((p.width, p.height), (MIN_PIECE_SIZE, MIN_PIECE_SIZE));
}

#[test]
fn delete_removes_exactly_one_entry() {
    let mut c = controller_with_selected(0.0);
    c.state_mut()
        .geometry
        .place(piece("toe_crest", 200.0, 100.0, 0.0))
        .expect("place");
    let before = c.state().geometry.piece_count();

    assert_eq!(c.dispatch(EditorEvent::Key(Key::Delete)), Transition::Changed);
    let state = c.state();
    assert_eq!(state.geometry.piece_count(), before - 1);
    assert!(state.geometry.piece("heel_lift").is_none());
    assert!(!state.geometry.is_selected_in_catalog("heel_lift"));
    assert!(state.geometry.piece("toe_crest").is_some());
    assert_eq!(state.selection, None);

    assert_eq!(c.dispatch(EditorEvent::Key(Key::Delete)), Transition::Noop);
}

#[test]
fn background_click_clears_selection() {
    let mut c = controller_with_selected(0.0);
    assert_eq!(c.dispatch(down(600.0, 900.0)), Transition::Changed);
    assert_eq!(c.state().selection, None);
    assert_eq!(c.dispatch(down(600.0, 900.0)), Transition::Noop);
}

#[test]
fn clicking_piece_selects_it() {
    let mut c = controller_with_selected(0.0);
    c.state_mut().selection = None;
    c.dispatch(down(200.0, 300.0));
    assert_eq!(c.state().selection.as_deref(), Some("heel_lift"));
}

#[test]
fn escape_clears_selection() {
    let mut c = controller_with_selected(0.0);
    assert_eq!(c.dispatch(EditorEvent::Key(Key::Escape)), Transition::Changed);
    assert_eq!(c.state().selection, None);
}

#[test]
fn guide_endpoint_and_circle_drag() {
    let mut state = EditorState::new(ShoeSize::default(), FootSide::Left);
    let guide = state
        .geometry
        .add_guide(Point::new(300.0, 100.0), Point::new(300.0, 600.0));
    let mut c = InteractionController::new(state, EditorSettings::default());

    c.dispatch(down(300.0, 600.0));
    c.dispatch(moved(320.0, 650.0, false));
    c.dispatch(EditorEvent::PointerUp);
    let g = c
        .state()
        .geometry
        .guides()
        .iter()
        .find(|g| g.id == guide)
        .expect("guide");
    assert_eq!((g.x2, g.y2), (320.0, 650.0));
    assert_eq!((g.x1, g.y1), (300.0, 100.0));

    let circle = *c.state().geometry.reference_circle();
    c.dispatch(down(circle.cx + 5.0, circle.cy));
    c.dispatch(moved(circle.cx + 105.0, circle.cy + 50.0, false));
    let moved_circle = c.state().geometry.reference_circle();
    assert!((moved_circle.cx - (circle.cx + 100.0)).abs() < 1e-9);
    assert!((moved_circle.cy - (circle.cy + 50.0)).abs() < 1e-9);
}

#[test]
fn toggle_seeds_catalog_placement_and_real_size() {
    let store = DimensionStore::catalog_only();
    let mut state = EditorState::new(ShoeSize::default(), FootSide::Right);
    assert!(state.toggle_piece("metatarsal_pad", &store).expect("toggle"));

    let entry = catalog::entry("metatarsal_pad").expect("entry");
    let (fw, fh) = state.frame_size();
    let (px, py) = entry.placement_for(FootSide::Right);
    let p = state.geometry.piece("metatarsal_pad").expect("placed");
    assert!((p.x - px * fw).abs() < 1e-9 && (p.y - py * fh).abs() < 1e-9);
    let real = store
        .real_scale(ShoeSize::default(), "metatarsal_pad")
        .expect("real");
    assert!((p.width - real.width).abs() < 1e-9);

    assert!(!state.toggle_piece("metatarsal_pad", &store).expect("toggle"));
    assert!(state.geometry.piece("metatarsal_pad").is_none());
    assert!(state.toggle_piece("no_such_piece", &store).is_err());
}

#[test]
fn shoe_size_change_scales_pieces_with_outline() {
    let store = DimensionStore::catalog_only();
    let mut state = EditorState::new(ShoeSize::new(38).expect("size"), FootSide::Left);
    state.toggle_piece("lateral_wedge", &store).expect("toggle");
    let before = state.geometry.piece("lateral_wedge").cloned().expect("piece");
    let (fw, fh) = state.frame_size();

    let bigger = ShoeSize::new(46).expect("size");
    state.set_shoe_size(bigger);
    let after = state.geometry.piece("lateral_wedge").expect("piece");
    let ratio = svg_scale(bigger) / svg_scale(ShoeSize::new(38).expect("size"));

    assert!((after.width - before.width * ratio).abs() < 1e-9);
    assert!((after.width / after.height - before.width / before.height).abs() < 1e-9);
    let (nw, nh) = state.frame_size();
    assert!((after.x / nw - before.x / fw).abs() < 1e-9);
    assert!((after.y / nh - before.y / fh).abs() < 1e-9);
}

proptest! {
    #[test]
    fn locked_resize_keeps_ratio_at_any_rotation(
        rotation in -360.0f64..360.0,
        lx in -400.0f64..400.0,
        ly in -400.0f64..400.0,
        corner_idx in 0usize..4,
    ) {
        let mut p = piece("heel_lift", 200.0, 300.0, rotation);
        let ratio = p.width / p.height;
        let at = (p.center() + Point::new(lx, ly)).rotated_about(p.center(), rotation);
        resize_piece(&mut p, Corner::ALL[corner_idx], at, Some(ratio), 20.0);
        prop_assert!(((p.width / p.height) - ratio).abs() < 1e-9);
        prop_assert!(p.width >= 20.0 && p.height >= 20.0);
    }

    #[test]
    fn unlocked_resize_tracks_pointer_in_piece_frame(
        rotation in -360.0f64..360.0,
        lx in 15.0f64..400.0,
        ly in 15.0f64..400.0,
    ) {
        let mut p = piece("heel_lift", 200.0, 300.0, rotation);
        let at = (p.center() + Point::new(lx, ly)).rotated_about(p.center(), rotation);
        resize_piece(&mut p, Corner::BottomRight, at, None, 20.0);
        prop_assert!((p.width - (2.0 * lx).max(20.0)).abs() < 1e-6);
        prop_assert!((p.height - (2.0 * ly).max(20.0)).abs() < 1e-6);
    }
}
