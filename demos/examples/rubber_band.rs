// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rubber-band selection and picking.
//!
//! The broad phase returns every node whose bounds touch the band; the
//! precise pass drops the ellipse whose corner is empty.
//!
//! Run:
//! - `cargo run -p vellum_demos --example rubber_band`

use kurbo::{Affine, Point, Rect};
use tracing_subscriber::EnvFilter;
use vellum_edit::{EditorSession, SessionConfig};
use vellum_model::{EditOperation, Guid, NodeRecord, NodeType, OrderKey};
use vellum_scene::IndexBackend;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SessionConfig {
        backend: IndexBackend::Flat,
        ..SessionConfig::default()
    };
    let mut session = EditorSession::new(config);
    let doc = Guid::new(0, 0);
    let ellipse = Guid::new(0, 1);
    let square = Guid::new(0, 2);
    let first = OrderKey::first();
    session
        .push_edit_operations([
            EditOperation::Create(NodeRecord::new(doc, NodeType::Document)),
            EditOperation::Create(
                NodeRecord::new(ellipse, NodeType::Ellipse)
                    .with_size(100.0, 100.0)
                    .with_parent(doc, first.clone()),
            ),
            EditOperation::Create(
                NodeRecord::new(square, NodeType::Rectangle)
                    .with_size(40.0, 40.0)
                    .with_transform(Affine::translate((90.0, 90.0)))
                    .with_parent(doc, first.plus_one()),
            ),
        ])
        .unwrap();

    let band = Rect::new(0.0, 0.0, 10.0, 10.0);
    let broad = session.search(band);
    let precise = session.test_collision(band, &broad);
    println!("broad phase: {broad:?}");
    println!("precise: {precise:?}");
    assert_eq!(broad, [ellipse]);
    assert!(precise.is_empty(), "the band only covers the ellipse's empty corner");

    let picked = session.box_select(Rect::new(80.0, 80.0, 100.0, 100.0));
    println!("box select: {picked:?}");
    session.select(&picked).unwrap();

    let hit = session.hit_test_point(Point::new(95.0, 95.0));
    println!("topmost at (95, 95): {hit:?}");
    assert_eq!(hit.map(|h| h.node), Some(square));
}
