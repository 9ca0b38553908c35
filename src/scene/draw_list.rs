use std::cmp::Ordering;

use super::SceneState;

/// Fixed-function state a draw needs from its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub blend: bool,
    pub double_sided: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTarget {
    Card(usize),
    Mesh(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub target: DrawTarget,
    pub render_order: i32,
    pub state: DrawState,
    /// Distance from the camera along its view direction
    pub view_depth: f32,
}

/// Draws for one frame, in submission order.
///
/// Opaque draws come first, then blended ones. Each group is ordered by render
/// order; ties go front to back for opaque draws and back to front for blended
/// draws. Equal depths keep insertion order.
pub fn build_draw_list(scene: &SceneState) -> Vec<DrawItem> {
    let mut items = Vec::with_capacity(scene.cards.len() + 8);

    if let Some(pivot) = &scene.pivot {
        let model = pivot.model();
        let matrix = pivot.model_matrix();

        for (i, mesh) in model.data.meshes.iter().enumerate() {
            let mesh_state = model.mesh_states[i];
            let center = matrix.transform_point3(model.mesh_centers[i]);

            items.push(DrawItem {
                target: DrawTarget::Mesh(i),
                render_order: mesh_state.render_order,
                state: DrawState {
                    depth_test: mesh_state.depth_test,
                    depth_write: mesh_state.depth_write,
                    blend: mesh.material.blend,
                    double_sided: mesh.material.double_sided,
                },
                view_depth: scene.camera.view_depth(center),
            });
        }
    }

    for (i, card) in scene.cards.iter().enumerate() {
        items.push(DrawItem {
            target: DrawTarget::Card(i),
            render_order: card.render_order,
            state: DrawState {
                depth_test: card.material.depth_test,
                depth_write: card.material.depth_write,
                blend: true,
                double_sided: true,
            },
            view_depth: scene.camera.view_depth(card.pose.position),
        });
    }

    sort_draw_items(&mut items);
    items
}

pub fn sort_draw_items(items: &mut [DrawItem]) {
    items.sort_by(|a, b| {
        a.state
            .blend
            .cmp(&b.state.blend)
            .then(a.render_order.cmp(&b.render_order))
            .then_with(|| {
                let (near, far) = if a.state.blend { (b, a) } else { (a, b) };
                near.view_depth.partial_cmp(&far.view_depth).unwrap_or(Ordering::Equal)
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(target: DrawTarget, render_order: i32, blend: bool, view_depth: f32) -> DrawItem {
        DrawItem {
            target,
            render_order,
            state: DrawState {
                depth_test: true,
                depth_write: true,
                blend,
                double_sided: false,
            },
            view_depth,
        }
    }

    #[test]
    fn test_opaque_before_blended() {
        let mut items = vec![
            item(DrawTarget::Card(0), -1, true, 5.0),
            item(DrawTarget::Mesh(0), 0, false, 5.0),
        ];
        sort_draw_items(&mut items);
        assert_eq!(items[0].target, DrawTarget::Mesh(0));
    }

    #[test]
    fn test_render_order_within_blended() {
        let mut items = vec![
            item(DrawTarget::Card(0), 999, true, 20.0),
            item(DrawTarget::Card(1), -1, true, 1.0),
        ];
        sort_draw_items(&mut items);
        assert_eq!(items[0].target, DrawTarget::Card(1));
        assert_eq!(items[1].target, DrawTarget::Card(0));
    }

    #[test]
    fn test_blended_ties_go_back_to_front() {
        let mut items = vec![
            item(DrawTarget::Card(0), -1, true, 10.0),
            item(DrawTarget::Card(1), -1, true, 30.0),
            item(DrawTarget::Card(2), -1, true, 20.0),
        ];
        sort_draw_items(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.target).collect();
        assert_eq!(
            order,
            vec![DrawTarget::Card(1), DrawTarget::Card(2), DrawTarget::Card(0)]
        );
    }

    #[test]
    fn test_opaque_ties_go_front_to_back() {
        let mut items = vec![
            item(DrawTarget::Mesh(0), 0, false, 50.0),
            item(DrawTarget::Mesh(1), 0, false, 1.0),
            item(DrawTarget::Mesh(2), 0, false, 25.0),
        ];
        sort_draw_items(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.target).collect();
        assert_eq!(
            order,
            vec![DrawTarget::Mesh(1), DrawTarget::Mesh(2), DrawTarget::Mesh(0)]
        );
    }

    #[test]
    fn test_equal_depth_keeps_insertion_order() {
        let mut items = vec![
            item(DrawTarget::Mesh(0), 0, false, 7.0),
            item(DrawTarget::Mesh(1), 0, false, 7.0),
            item(DrawTarget::Card(0), 0, true, 7.0),
            item(DrawTarget::Card(1), 0, true, 7.0),
        ];
        sort_draw_items(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.target).collect();
        assert_eq!(
            order,
            vec![
                DrawTarget::Mesh(0),
                DrawTarget::Mesh(1),
                DrawTarget::Card(0),
                DrawTarget::Card(1)
            ]
        );
    }
}
