use crate::tube::{TubeMesh, TubeVertex};

/// Unit quad in the XY plane centred on the origin, visible from both sides.
///
/// The back face has its own vertices with flipped normals so lighting stays
/// correct on either side.
pub fn leaf_quad() -> TubeMesh {
    let h = 0.5_f32;
    let corners = [[-h, -h], [h, -h], [h, h], [-h, h]];
    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut vertices = Vec::with_capacity(8);
    for normal_z in [1.0_f32, -1.0] {
        for (corner, uv) in corners.iter().zip(uvs) {
            vertices.push(TubeVertex {
                position: [corner[0], corner[1], 0.0],
                normal: [0.0, 0.0, normal_z],
                uv,
            });
        }
    }

    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2, 2, 3, 0, // front
        4, 6, 5, 6, 4, 7, // back
    ];

    TubeMesh {
        vertices,
        indices,
        rings: Vec::new(),
    }
}
