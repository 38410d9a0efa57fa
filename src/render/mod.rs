// SPDX-License-Identifier: GPL-3.0-only

//! Texture upload and draw stage
//!
//! [`Preview`] owns the GPU resources for the camera preview: one render
//! pipeline and one fixed-size RGBA8 upload texture, allocated at
//! initialization and never reallocated. Each draw pass fetches the variant
//! selected by the current render mode, normalizes it to the upload format,
//! resamples it to the texture size and draws a single oriented quad.
//!
//! Every pass clears the target first, so an aborted pass leaves the
//! background color rather than stale or garbage pixels.

pub mod geometry;

use crate::constants::{capture, texture};
use crate::controls::RenderControls;
use crate::errors::RenderError;
use crate::frame::PixelBuffer;
use crate::store::FrameStore;
use geometry::Vertex;
use tracing::{debug, info, warn};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

/// GPU preview renderer with a persistent upload texture
pub struct Preview {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    upload_texture: wgpu::Texture,
    vertex_buffer: wgpu::Buffer,
    target: wgpu::Texture,
    viewport: (u32, u32),
}

impl Preview {
    /// Initialize the GPU device, pipeline and persistent textures
    ///
    /// On failure the caller should log and keep running with rendering
    /// disabled; nothing here panics.
    pub fn new() -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            "GPU adapter selected for preview"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("edgecam preview device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::DeviceCreation(e.to_string()))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("edgecam preview shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("preview.wgsl").into()),
        });

        // Allocated once, overwritten wholesale each pass
        let upload_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("edgecam upload texture"),
            size: wgpu::Extent3d {
                width: texture::UPLOAD_WIDTH,
                height: texture::UPLOAD_HEIGHT,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        // Nearest filtering with edge clamping; interpolation across the
        // resampled frame boundary shows as line artifacts.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("edgecam preview sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("edgecam preview bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let texture_view = upload_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("edgecam preview bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("edgecam preview pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("edgecam preview pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("edgecam quad vertex buffer"),
            size: (std::mem::size_of::<Vertex>() * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport = (capture::DEFAULT_WIDTH, capture::DEFAULT_HEIGHT);
        let target = create_target(&device, viewport.0, viewport.1);

        info!(
            upload_width = texture::UPLOAD_WIDTH,
            upload_height = texture::UPLOAD_HEIGHT,
            "Preview renderer initialized"
        );

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group,
            upload_texture,
            vertex_buffer,
            target,
            viewport,
        })
    }

    /// Current output dimensions
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Update the output dimensions
    ///
    /// Only the render target changes; the upload texture keeps its fixed
    /// allocation.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            warn!(width, height, "Ignoring resize to zero dimensions");
            return;
        }
        self.viewport = (width, height);
        self.target = create_target(&self.device, width, height);
        debug!(width, height, "Preview resized");
    }

    /// Run one draw pass: fetch, normalize, upload, draw
    ///
    /// The target is cleared to the background color first; any failure
    /// after that aborts the pass, leaving the cleared target.
    pub fn draw_pass(
        &mut self,
        store: &FrameStore,
        controls: &RenderControls,
    ) -> Result<(), RenderError> {
        let mode = controls.mode();
        let orientation = controls.orientation();
        let frame = store.fetch(mode.variant());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("edgecam preview encoder"),
            });
        self.record_clear(&mut encoder);

        let result = match self.prepare_upload(frame) {
            Ok(rgba) => {
                self.queue.write_texture(
                    wgpu::ImageCopyTexture {
                        texture: &self.upload_texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    &rgba.data,
                    wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: Some(texture::UPLOAD_WIDTH * texture::BYTES_PER_PIXEL),
                        rows_per_image: None,
                    },
                    wgpu::Extent3d {
                        width: texture::UPLOAD_WIDTH,
                        height: texture::UPLOAD_HEIGHT,
                        depth_or_array_layers: 1,
                    },
                );

                let vertices = geometry::vertices_for(orientation);
                self.queue
                    .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));

                self.record_draw(&mut encoder);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, ?mode, "Render pass aborted, showing background");
                Err(e)
            }
        };

        self.queue.submit(Some(encoder.finish()));
        result
    }

    /// Run one draw pass and read the rendered target back as a 4-channel
    /// buffer
    ///
    /// A failed pass still yields an image: the cleared background.
    pub fn render_to_image(
        &mut self,
        store: &FrameStore,
        controls: &RenderControls,
    ) -> Result<PixelBuffer, RenderError> {
        // Pass failures are already logged and leave the cleared target
        let _ = self.draw_pass(store, controls);
        self.read_target()
    }

    /// Validate and normalize a fetched frame for upload
    fn prepare_upload(&self, frame: PixelBuffer) -> Result<PixelBuffer, RenderError> {
        if frame.is_empty() {
            return Err(RenderError::EmptyFrame);
        }
        if !frame.is_consistent() {
            return Err(RenderError::SizeMismatch {
                expected: frame.expected_len(),
                actual: frame.data.len(),
            });
        }

        let rgba = frame.to_rgba().map_err(RenderError::from)?;
        let rgba = if rgba.width != texture::UPLOAD_WIDTH || rgba.height != texture::UPLOAD_HEIGHT {
            rgba.resized(texture::UPLOAD_WIDTH, texture::UPLOAD_HEIGHT)
                .map_err(RenderError::from)?
        } else {
            rgba
        };

        // Must hold after resize; guarded so malformed sizes never reach wgpu
        let expected =
            (texture::UPLOAD_WIDTH * texture::UPLOAD_HEIGHT * texture::BYTES_PER_PIXEL) as usize;
        if rgba.data.len() != expected {
            return Err(RenderError::SizeMismatch {
                expected,
                actual: rgba.data.len(),
            });
        }
        Ok(rgba)
    }

    fn record_clear(&self, encoder: &mut wgpu::CommandEncoder) {
        let view = self.target.create_view(&wgpu::TextureViewDescriptor::default());
        let [r, g, b, a] = texture::BACKGROUND;
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("edgecam clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    fn record_draw(&self, encoder: &mut wgpu::CommandEncoder) {
        let view = self.target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("edgecam draw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..4, 0..1);
    }

    /// Copy the render target into CPU memory
    fn read_target(&self) -> Result<PixelBuffer, RenderError> {
        let (width, height) = self.viewport;
        let unpadded_bytes_per_row = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = (unpadded_bytes_per_row + align - 1) / align * align;
        let buffer_size = (padded_bytes_per_row * height) as u64;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("edgecam readback buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("edgecam readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        pollster::block_on(rx)
            .map_err(|e| RenderError::Readback(e.to_string()))?
            .map_err(|e| RenderError::Readback(e.to_string()))?;

        let mapped = slice.get_mapped_range();
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for row in 0..height {
            let start = (row * padded_bytes_per_row) as usize;
            data.extend_from_slice(&mapped[start..start + unpadded_bytes_per_row as usize]);
        }
        drop(mapped);
        staging.unmap();

        Ok(PixelBuffer {
            width,
            height,
            channels: 4,
            data,
        })
    }
}

fn create_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("edgecam render target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelBuffer;

    fn preview_or_skip() -> Option<Preview> {
        match Preview::new() {
            Ok(preview) => Some(preview),
            Err(e) => {
                // No GPU in this environment
                eprintln!("Skipping render test: {}", e);
                None
            }
        }
    }

    fn center_pixel(image: &PixelBuffer) -> [u8; 4] {
        let x = image.width / 2;
        let y = image.height / 2;
        let idx = ((y * image.width + x) * 4) as usize;
        [
            image.data[idx],
            image.data[idx + 1],
            image.data[idx + 2],
            image.data[idx + 3],
        ]
    }

    #[test]
    fn test_empty_store_renders_fallback_blue() {
        let Some(mut preview) = preview_or_skip() else {
            return;
        };
        let store = FrameStore::new();
        let controls = RenderControls::new();

        let image = preview.render_to_image(&store, &controls).unwrap();
        assert_eq!((image.width, image.height), preview.viewport());
        let [r, g, b, a] = center_pixel(&image);
        assert_eq!((r, g, b, a), (0, 0, 255, 255));
    }

    #[test]
    fn test_published_frame_reaches_target() {
        let Some(mut preview) = preview_or_skip() else {
            return;
        };
        let store = FrameStore::new();
        let controls = RenderControls::new();
        controls.set_mode(crate::controls::RenderMode::RawCamera);

        let frame = PixelBuffer::solid(64, 64, [130, 130, 130]);
        store.publish(frame.clone(), frame.clone(), frame);

        let image = preview.render_to_image(&store, &controls).unwrap();
        let [r, g, b, _] = center_pixel(&image);
        assert_eq!((r, g, b), (130, 130, 130));
    }

    #[test]
    fn test_resize_updates_viewport_only() {
        let Some(mut preview) = preview_or_skip() else {
            return;
        };
        preview.resize(128, 64);
        assert_eq!(preview.viewport(), (128, 64));

        let store = FrameStore::new();
        let controls = RenderControls::new();
        let image = preview.render_to_image(&store, &controls).unwrap();
        assert_eq!((image.width, image.height), (128, 64));
    }

    #[test]
    fn test_resize_to_zero_is_ignored() {
        let Some(mut preview) = preview_or_skip() else {
            return;
        };
        let before = preview.viewport();
        preview.resize(0, 10);
        assert_eq!(preview.viewport(), before);
    }
}
