use crate::mesh::{box_mesh, flat_mesh, sphere_mesh, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use pickscene_common::ObjectId;
use pickscene_render::OrbitCamera;
use pickscene_scene::{Model, PickableObject, Scene, Shape};
use wgpu::util::DeviceExt;

const SPHERE_SEGMENTS: u32 = 16;
const SPHERE_RINGS: u32 = 16;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    params: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4], lit: bool) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
            params: [if lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

struct IndexedMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl IndexedMesh {
    fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex], indices: &[u16]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Uploaded geometry of one model mesh part.
struct PartMesh {
    id: ObjectId,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Instances grouped by the geometry they draw with.
#[derive(Default)]
struct FrameInstances {
    spheres: Vec<InstanceData>,
    boxes: Vec<InstanceData>,
    /// (index into uploaded parts, instance)
    parts: Vec<(usize, InstanceData)>,
}

impl FrameInstances {
    fn push(&mut self, object: &PickableObject, parent: Mat4, lit: bool, parts: &[PartMesh]) {
        let world = parent * object.transform.matrix();
        let color = object.color.to_array();
        match &object.shape {
            Shape::Sphere { radius } => self.spheres.push(InstanceData::new(
                world * Mat4::from_scale(Vec3::splat(*radius)),
                color,
                lit,
            )),
            Shape::Box { half_extents } => self.boxes.push(InstanceData::new(
                world * Mat4::from_scale(*half_extents),
                color,
                lit,
            )),
            Shape::Mesh(_) => match parts.iter().position(|p| p.id == object.id) {
                Some(index) => self.parts.push((index, InstanceData::new(world, color, lit))),
                None => tracing::trace!(tag = %object.tag, "mesh part not uploaded"),
            },
        }
    }

    fn len(&self) -> usize {
        self.spheres.len() + self.boxes.len() + self.parts.len()
    }

    fn flatten(&self) -> Vec<InstanceData> {
        let mut all = Vec::with_capacity(self.len());
        all.extend_from_slice(&self.spheres);
        all.extend_from_slice(&self.boxes);
        all.extend(self.parts.iter().map(|(_, instance)| *instance));
        all
    }
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sphere: IndexedMesh,
    cube: IndexedMesh,
    parts: Vec<PartMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Imported meshes have arbitrary winding.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (sphere_verts, sphere_indices) = sphere_mesh(SPHERE_SEGMENTS, SPHERE_RINGS);
        let sphere = IndexedMesh::new(device, "sphere", &sphere_verts, &sphere_indices);
        let (cube_verts, cube_indices) = box_mesh();
        let cube = IndexedMesh::new(device, "cube", &cube_verts, &cube_indices);

        let max_instances = 1024u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            sphere,
            cube,
            parts: Vec::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Upload the mesh parts of a freshly installed model. Replaces any
    /// earlier upload.
    pub fn upload_model(&mut self, device: &wgpu::Device, model: &Model) {
        self.parts = model
            .parts()
            .iter()
            .filter_map(|part| match &part.shape {
                Shape::Mesh(mesh) => {
                    let vertices = flat_mesh(mesh);
                    let vertex_buffer =
                        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("{}_vertex_buffer", part.tag)),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                    Some(PartMesh {
                        id: part.id,
                        vertex_buffer,
                        vertex_count: vertices.len() as u32,
                    })
                }
                _ => None,
            })
            .collect();
        tracing::debug!(model = %model.name, meshes = self.parts.len(), "uploaded model geometry");
    }

    /// Render one frame: unlit primary objects, then lit model parts.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &Scene,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
            }),
        );

        let mut frame = FrameInstances::default();
        for object in scene.objects() {
            frame.push(object, Mat4::IDENTITY, false, &self.parts);
        }
        if let Some(model) = scene.model() {
            let parent = model.matrix();
            for part in model.parts() {
                frame.push(part, parent, true, &self.parts);
            }
        }

        let mut instances = frame.flatten();
        if instances.len() > self.max_instances as usize {
            tracing::warn!(
                count = instances.len(),
                max = self.max_instances,
                "too many instances; dropping the excess"
            );
            instances.truncate(self.max_instances as usize);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        let drawable = instances.len() as u32;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.15,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            let spheres_end = (frame.spheres.len() as u32).min(drawable);
            if spheres_end > 0 {
                pass.set_vertex_buffer(0, self.sphere.vertex_buffer.slice(..));
                pass.set_index_buffer(self.sphere.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.sphere.index_count, 0, 0..spheres_end);
            }

            let boxes_end = (spheres_end + frame.boxes.len() as u32).min(drawable);
            if boxes_end > spheres_end {
                pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
                pass.set_index_buffer(self.cube.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube.index_count, 0, spheres_end..boxes_end);
            }

            for (i, (part_index, _)) in frame.parts.iter().enumerate() {
                let instance = boxes_end + i as u32;
                if instance >= drawable {
                    break;
                }
                let part = &self.parts[*part_index];
                pass.set_vertex_buffer(0, part.vertex_buffer.slice(..));
                pass.draw(0..part.vertex_count, instance..instance + 1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
