// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session basics.
//!
//! Create a document with two shapes, move and rotate them, then walk the
//! history back and forth.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p vellum_demos --example session_basics`

use core::f64::consts::FRAC_PI_4;

use kurbo::{Affine, Point, Vec2};
use tracing_subscriber::EnvFilter;
use vellum_edit::{EditorSession, ResizeHandle, SessionConfig};
use vellum_model::{Color, EditOperation, Guid, NodeRecord, NodeType, Paint};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut session = EditorSession::new(SessionConfig::default());
    session.subscribe(|ids| println!("changed: {ids:?}"));

    let doc = Guid::new(0, 0);
    session
        .push_edit_operations([EditOperation::Create(
            NodeRecord::new(doc, NodeType::Document).with_name("Document"),
        )])
        .unwrap();

    let mut shapes = Vec::new();
    for (i, kind) in [NodeType::Rectangle, NodeType::Ellipse].into_iter().enumerate() {
        let guid = session.next_guid();
        let position = session.sibling_position(doc, None, None).unwrap();
        session
            .push_edit_operations([EditOperation::Create(
                NodeRecord::new(guid, kind)
                    .with_name(format!("Shape {i}"))
                    .with_size(80.0, 40.0)
                    .with_transform(Affine::translate((i as f64 * 120.0, 0.0)))
                    .with_fill(Paint::solid(Color::rgb(0.2, 0.4, 0.9)))
                    .with_parent(doc, position),
            )])
            .unwrap();
        shapes.push(guid);
    }
    session.push_stack_element();

    session.select(&shapes).unwrap();
    // A drag: many small moves, one undo step.
    for _ in 0..10 {
        session.translate_selection(Vec2::new(5.0, 2.0)).unwrap();
    }
    session.push_stack_element();
    println!("after drag: {:?}", session.selection_obb());

    session.rotate_selection(FRAC_PI_4, None).unwrap();
    session.push_stack_element();
    println!("after rotate: {:?}", session.selection_obb());

    let grown = session
        .resize_selection(ResizeHandle::BOTTOM_RIGHT, Point::new(400.0, 300.0))
        .unwrap();
    session.push_stack_element();
    println!("after resize: {grown:?}");

    while session.undo().unwrap() {
        println!("undo -> {} records", session.store().len());
    }
    while session.redo().unwrap() {
        println!("redo -> {} records", session.store().len());
    }
    println!("{}", session.to_json().unwrap());
}
