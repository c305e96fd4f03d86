use crate::AssetError;
use glam::Vec3;
use pickscene_common::Transform;
use pickscene_scene::{Model, PickableObject, Shape, TriangleMesh};
use std::path::Path;
use std::sync::Arc;
use tobj::LoadOptions;

/// Load a Wavefront OBJ file. Every OBJ object with at least one face
/// becomes a mesh part tagged `model/<object name>`.
///
/// The model has an identity root and white parts; callers place and
/// color it.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Model, AssetError> {
    let path = path.as_ref();
    let (obj_models, _materials) = tobj::load_obj(
        path,
        &LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
        },
    )?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".into());
    let mut model = Model::new(name, Transform::default());

    for (i, m) in obj_models.into_iter().enumerate() {
        if m.mesh.indices.len() < 3 {
            tracing::debug!(object = %m.name, "skipping OBJ object without faces");
            continue;
        }
        let positions = m
            .mesh
            .positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        let indices = m
            .mesh
            .indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        let mesh = TriangleMesh::new(positions, indices)?;

        let part_name = if m.name.is_empty() {
            format!("part-{i}")
        } else {
            m.name
        };
        model.add_part(
            PickableObject::new(format!("model/{part_name}"), Shape::Mesh(Arc::new(mesh)))
                .with_name(part_name),
        );
    }

    if model.part_count() == 0 {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }
    tracing::debug!(path = %path.display(), parts = model.part_count(), "loaded OBJ");
    Ok(model)
}
