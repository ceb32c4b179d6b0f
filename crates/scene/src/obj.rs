use std::io::{self, Write};

use arbor_mesh::TubeMesh;

use crate::recording::RecordingScene;

/// Write `mesh` as a Wavefront OBJ document with positions, uvs and normals.
pub fn write_obj(mesh: &TubeMesh, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "# arbor mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;
    for v in &mesh.vertices {
        let [x, y, z] = v.position;
        writeln!(out, "v {x:.6} {y:.6} {z:.6}")?;
    }
    for v in &mesh.vertices {
        let [u, w] = v.uv;
        writeln!(out, "vt {u:.6} {w:.6}")?;
    }
    for v in &mesh.vertices {
        let [x, y, z] = v.normal;
        writeln!(out, "vn {x:.6} {y:.6} {z:.6}")?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    Ok(())
}

/// Write every mesh in the scene, in world space, as one OBJ object.
pub fn write_scene_obj(scene: &RecordingScene, out: &mut impl Write) -> io::Result<()> {
    write_obj(&scene.combined_mesh(), out)
}
