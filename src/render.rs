use crate::{Disk, DiskSink, Viewport};
use std::borrow::Cow;
use wgpu::{util::DeviceExt, PipelineCompilationOptions};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
  r: 0.02,
  g: 0.02,
  b: 0.04,
  a: 1.0,
};

/// Two triangles covering the unit square; the fragment shader cuts the disk out.
const QUAD_CORNERS: [[f32; 2]; 6] = [
  [-1.0, -1.0],
  [1.0, -1.0],
  [1.0, 1.0],
  [-1.0, -1.0],
  [1.0, 1.0],
  [-1.0, 1.0],
];

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct DiskInstance {
  center: [f32; 2],
  radius: f32,
  color: [f32; 4],
}

impl From<Disk> for DiskInstance {
  fn from(disk: Disk) -> Self {
    Self {
      center: disk.center,
      radius: disk.radius,
      color: disk.color,
    }
  }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ViewportUniform {
  size: [f32; 2],
  _pad: [f32; 2],
}

impl From<Viewport> for ViewportUniform {
  fn from(viewport: Viewport) -> Self {
    Self {
      size: [viewport.width, viewport.height],
      _pad: [0.0; 2],
    }
  }
}

/// Collects disks for a frame and draws them as alpha-blended instanced quads.
pub struct DiskRenderer {
  pipeline: wgpu::RenderPipeline,
  quad_buffer: wgpu::Buffer,
  instance_buffer: wgpu::Buffer,
  instance_capacity: usize,
  viewport_buffer: wgpu::Buffer,
  viewport_bind_group: wgpu::BindGroup,
  viewport: Viewport,
  instances: Vec<DiskInstance>,
}

impl DiskRenderer {
  #[must_use]
  pub fn init(config: &wgpu::SurfaceConfiguration, device: &wgpu::Device, capacity: usize) -> Self {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: Some("disk shader"),
      source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/disk.wgsl"))),
    });

    let viewport = Viewport {
      width: config.width as f32,
      height: config.height as f32,
    };
    let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Viewport Buffer"),
      contents: bytemuck::bytes_of(&ViewportUniform::from(viewport)),
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let viewport_bind_group_layout =
      device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::VERTEX,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ViewportUniform>() as _),
          },
          count: None,
        }],
        label: Some("viewport_bind_group_layout"),
      });
    let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      layout: &viewport_bind_group_layout,
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: viewport_buffer.as_entire_binding(),
      }],
      label: Some("viewport_bind_group"),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("disks"),
      bind_group_layouts: &[&viewport_bind_group_layout],
      push_constant_ranges: &[],
    });
    let instance_layout = wgpu::VertexBufferLayout {
      array_stride: std::mem::size_of::<DiskInstance>() as wgpu::BufferAddress,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32x4],
    };
    let corner_layout = wgpu::VertexBufferLayout {
      array_stride: 2 * 4,
      step_mode: wgpu::VertexStepMode::Vertex,
      attributes: &wgpu::vertex_attr_array![3 => Float32x2],
    };
    let target_format = config.view_formats.first().copied().unwrap_or(config.format);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
      label: Some("Disk Pipeline"),
      layout: Some(&pipeline_layout),
      vertex: wgpu::VertexState {
        module: &shader,
        entry_point: "main_vs",
        compilation_options: PipelineCompilationOptions::default(),
        buffers: &[instance_layout, corner_layout],
      },
      fragment: Some(wgpu::FragmentState {
        module: &shader,
        entry_point: "main_fs",
        compilation_options: PipelineCompilationOptions::default(),
        targets: &[Some(wgpu::ColorTargetState {
          format: target_format,
          blend: Some(wgpu::BlendState::ALPHA_BLENDING),
          write_mask: wgpu::ColorWrites::ALL,
        })],
      }),
      primitive: wgpu::PrimitiveState::default(),
      depth_stencil: None,
      multisample: wgpu::MultisampleState::default(),
      multiview: None,
      cache: None,
    });

    let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Quad Buffer"),
      contents: bytemuck::cast_slice(&QUAD_CORNERS),
      usage: wgpu::BufferUsages::VERTEX,
    });
    let instance_capacity = capacity.max(1);
    let instance_buffer = create_instance_buffer(device, instance_capacity);

    Self {
      pipeline,
      quad_buffer,
      instance_buffer,
      instance_capacity,
      viewport_buffer,
      viewport_bind_group,
      viewport,
      instances: Vec::with_capacity(instance_capacity),
    }
  }

  /// Uploads the disks collected since the last `clear` and draws them into `view`.
  pub fn present(&mut self, view: &wgpu::TextureView, device: &wgpu::Device, queue: &wgpu::Queue) {
    if self.instances.len() > self.instance_capacity {
      self.instance_capacity = self.instances.len().next_power_of_two();
      self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
      log::debug!("grew disk instance buffer to {}", self.instance_capacity);
    }
    queue.write_buffer(
      &self.viewport_buffer,
      0,
      bytemuck::bytes_of(&ViewportUniform::from(self.viewport)),
    );
    if !self.instances.is_empty() {
      queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
    }

    let color_attachments = [Some(wgpu::RenderPassColorAttachment {
      view,
      resolve_target: None,
      ops: wgpu::Operations {
        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
        store: wgpu::StoreOp::Store,
      },
    })];
    let mut command_encoder =
      device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
      let mut rpass = command_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("disks"),
        color_attachments: &color_attachments,
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
      });
      rpass.set_pipeline(&self.pipeline);
      rpass.set_bind_group(0, &self.viewport_bind_group, &[]);
      rpass.set_vertex_buffer(0, self.instance_buffer.slice(..));
      rpass.set_vertex_buffer(1, self.quad_buffer.slice(..));
      rpass.draw(0..QUAD_CORNERS.len() as u32, 0..self.instances.len() as u32);
    }
    queue.submit(Some(command_encoder.finish()));
  }
}

impl DiskSink for DiskRenderer {
  fn clear(&mut self, viewport: Viewport) {
    self.viewport = viewport;
    self.instances.clear();
  }

  fn draw_disk(&mut self, disk: Disk) {
    self.instances.push(disk.into());
  }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
  device.create_buffer(&wgpu::BufferDescriptor {
    label: Some("Disk Instance Buffer"),
    size: (capacity * std::mem::size_of::<DiskInstance>()) as wgpu::BufferAddress,
    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    mapped_at_creation: false,
  })
}
