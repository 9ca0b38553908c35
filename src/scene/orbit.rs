//! Card ring orbiting the model.
//!
//! Every card attribute is a pure function of wall-clock time and the card
//! index; nothing is accumulated between frames. Angles are computed in `f64`
//! because the time base is seconds since the Unix epoch.

use glam::{Mat4, Vec3};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::math::hex_to_linear;
use crate::types::Vertex;

pub const CARD_COUNT: usize = 16;
pub const CARD_WIDTH: f32 = 1.7;
pub const CARD_HEIGHT: f32 = 2.5;
pub const CARD_COLOR: u32 = 0x442222;
pub const CARD_OPACITY: f32 = 0.9;

pub const ORBIT_SPEED: f64 = 0.8; // rad/s
pub const ORBIT_RADIUS: f64 = 7.0;
pub const ORBIT_DEPTH_SQUASH: f64 = 0.15;
pub const ORBIT_Z_OFFSET: f64 = -2.0;
pub const ORBIT_BOB: f64 = 0.8;
pub const ORBIT_Y_OFFSET: f64 = -0.4;

pub const MIN_SCALE: f32 = 0.7;
pub const MAX_SCALE: f32 = 1.3;

/// Draw order for cards in the front half: after everything else
pub const FRONT_RENDER_ORDER: i32 = 999;
/// Draw order for cards in the back half: before everything else
pub const BACK_RENDER_ORDER: i32 = -1;

/// Which half of the orbit a card is travelling through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbitHalf {
    /// Orbit angle in [0°, 180°): drawn over the model
    Front,
    /// Orbit angle in [180°, 360°): depth tested against the model
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPose {
    pub position: Vec3,
    /// Rotation about +Y, normalized to [0, 2π)
    pub rotation_y: f32,
    pub scale: f32,
}

impl Default for CardPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_y: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardMaterial {
    pub color: [f32; 3],
    pub opacity: f32,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl Default for CardMaterial {
    fn default() -> Self {
        Self {
            color: hex_to_linear(CARD_COLOR),
            opacity: 1.0,
            depth_test: true,
            depth_write: true,
        }
    }
}

/// One decorative plane of the ring
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub index: usize,
    pub pose: CardPose,
    pub material: CardMaterial,
    pub render_order: i32,
}

impl Card {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            pose: CardPose::default(),
            material: CardMaterial::default(),
            render_order: 0,
        }
    }

    /// Recompute every per-frame attribute from the orbit angle
    pub fn apply(&mut self, angle: f64) {
        self.pose = card_pose(angle);

        let half = orbit_half(angle);
        let in_front = half == OrbitHalf::Front;
        self.material.depth_test = !in_front;
        self.material.depth_write = !in_front;
        self.material.opacity = CARD_OPACITY;
        self.render_order = match half {
            OrbitHalf::Front => FRONT_RENDER_ORDER,
            OrbitHalf::Back => BACK_RENDER_ORDER,
        };
    }

    /// Translation * rotation * scale
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.pose.position)
            * Mat4::from_rotation_y(self.pose.rotation_y)
            * Mat4::from_scale(Vec3::splat(self.pose.scale))
    }
}

/// Evenly spaced phase of card `index` out of `count`
pub fn phase_offset(index: usize, count: usize) -> f64 {
    (index as f64 / count as f64) * TAU
}

pub fn orbit_angle(time: f64, index: usize, count: usize) -> f64 {
    time * ORBIT_SPEED + phase_offset(index, count)
}

pub fn orbit_half(angle: f64) -> OrbitHalf {
    if angle.rem_euclid(TAU) < PI {
        OrbitHalf::Front
    } else {
        OrbitHalf::Back
    }
}

/// Flattened ellipse, scaled up in the front half and down in the back half
pub fn card_pose(angle: f64) -> CardPose {
    let (sin, cos) = angle.sin_cos();

    let position = Vec3::new(
        (cos * ORBIT_RADIUS) as f32,
        (-sin * ORBIT_BOB + ORBIT_Y_OFFSET) as f32,
        (sin * ORBIT_RADIUS * ORBIT_DEPTH_SQUASH + ORBIT_Z_OFFSET) as f32,
    );

    let scale_factor = ((sin + 1.0) / 2.0) as f32;

    CardPose {
        position,
        rotation_y: (FRAC_PI_2 - angle).rem_euclid(TAU) as f32,
        scale: (MIN_SCALE + (MAX_SCALE - MIN_SCALE) * scale_factor).clamp(MIN_SCALE, MAX_SCALE),
    }
}

/// Card plane in the XY plane facing +Z, centered on the origin
pub fn card_geometry() -> (Vec<Vertex>, Vec<u32>) {
    let (hw, hh) = (CARD_WIDTH / 2.0, CARD_HEIGHT / 2.0);
    let normal = [0.0, 0.0, 1.0];

    let vertices = vec![
        Vertex::new([-hw, -hh, 0.0], normal, [0.0, 1.0]),
        Vertex::new([hw, -hh, 0.0], normal, [1.0, 1.0]),
        Vertex::new([hw, hh, 0.0], normal, [1.0, 0.0]),
        Vertex::new([-hw, hh, 0.0], normal, [0.0, 0.0]),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];

    (vertices, indices)
}

/// The fixed batch of cards, in index order
pub fn create_cards() -> Vec<Card> {
    (0..CARD_COUNT).map(Card::new).collect()
}

pub fn update_cards(cards: &mut [Card], time: f64) {
    let count = cards.len();
    for card in cards.iter_mut() {
        card.apply(orbit_angle(time, card.index, count));
    }
}

/// Card ring as it looks at `time`
pub fn layout_at(time: f64) -> Vec<Card> {
    let mut cards = create_cards();
    update_cards(&mut cards, time);
    cards
}

/// Serializable view of a card, for layout dumps
#[derive(Debug, Clone, Serialize)]
pub struct CardSnapshot {
    pub index: usize,
    pub position: [f32; 3],
    pub rotation_y: f32,
    pub scale: f32,
    pub opacity: f32,
    pub depth_test: bool,
    pub render_order: i32,
    pub half: OrbitHalf,
}

impl CardSnapshot {
    pub fn new(card: &Card, angle: f64) -> Self {
        Self {
            index: card.index,
            position: card.pose.position.to_array(),
            rotation_y: card.pose.rotation_y,
            scale: card.pose.scale,
            opacity: card.material.opacity,
            depth_test: card.material.depth_test,
            render_order: card.render_order,
            half: orbit_half(angle),
        }
    }
}

pub fn snapshot_at(time: f64) -> Vec<CardSnapshot> {
    layout_at(time)
        .iter()
        .map(|card| CardSnapshot::new(card, orbit_angle(time, card.index, CARD_COUNT)))
        .collect()
}
