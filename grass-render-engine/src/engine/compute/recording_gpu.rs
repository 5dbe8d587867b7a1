use bevy::prelude::*;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use super::buffer_lifecycle::{GrassGpu, GrassGpuBuffers, GrassGpuResources};
use crate::engine::grass::settings::BladeShape;

#[derive(Debug, Clone, PartialEq)]
pub enum GpuOp {
    Create(&'static str),
    Write(&'static str, Vec<u8>),
    InstantiateKernel(BladeShape),
    InstantiateMaterial,
    Dispatch { groups: UVec3, flatten_bytes: u64 },
    Release(&'static str),
}

type OpLog = Rc<RefCell<Vec<GpuOp>>>;

pub struct RecordingResources;

impl GrassGpuResources for RecordingResources {
    type Buffer = RecordedBuffer;
    type Kernel = ();
    type Material = ();
}

/// Buffer that logs its own release.
pub struct RecordedBuffer {
    pub label: &'static str,
    pub size: u64,
    pub contents: Vec<u8>,
    log: OpLog,
    live: Rc<Cell<usize>>,
}

impl Drop for RecordedBuffer {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
        self.log.borrow_mut().push(GpuOp::Release(self.label));
    }
}

/// In-memory backend recording every call in order.
pub struct RecordingGpu {
    group_size: u32,
    pub kernel_ready: bool,
    log: OpLog,
    live: Rc<Cell<usize>>,
}

impl RecordingGpu {
    pub fn new(group_size: u32) -> Self {
        Self {
            group_size,
            kernel_ready: true,
            log: OpLog::default(),
            live: Rc::default(),
        }
    }

    pub fn ops(&self) -> Ref<'_, Vec<GpuOp>> {
        self.log.borrow()
    }

    pub fn clear_ops(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn live_buffers(&self) -> usize {
        self.live.get()
    }

    fn buffer(&mut self, label: &'static str, size: u64, contents: Vec<u8>) -> RecordedBuffer {
        self.live.set(self.live.get() + 1);
        self.log.borrow_mut().push(GpuOp::Create(label));
        RecordedBuffer {
            label,
            size,
            contents,
            log: self.log.clone(),
            live: self.live.clone(),
        }
    }
}

impl GrassGpu for RecordingGpu {
    type Resources = RecordingResources;

    fn create_storage_buffer(&mut self, label: &'static str, contents: &[u8]) -> RecordedBuffer {
        self.buffer(label, contents.len() as u64, contents.to_vec())
    }

    fn create_append_buffer(&mut self, label: &'static str, size: u64) -> RecordedBuffer {
        self.buffer(label, size, Vec::new())
    }

    fn create_counter_buffer(&mut self, label: &'static str) -> RecordedBuffer {
        self.buffer(label, 4, vec![0; 4])
    }

    fn create_indirect_buffer(&mut self, label: &'static str, contents: &[u8]) -> RecordedBuffer {
        self.buffer(label, contents.len() as u64, contents.to_vec())
    }

    fn create_uniform_buffer(&mut self, label: &'static str, contents: &[u8]) -> RecordedBuffer {
        self.buffer(label, contents.len() as u64, contents.to_vec())
    }

    fn write_buffer(&mut self, buffer: &RecordedBuffer, contents: &[u8]) {
        self.log
            .borrow_mut()
            .push(GpuOp::Write(buffer.label, contents.to_vec()));
    }

    fn instantiate_kernel(
        &mut self,
        _shader: &Handle<Shader>,
        _wind_noise: &Handle<Image>,
        blade_shape: BladeShape,
    ) {
        self.log
            .borrow_mut()
            .push(GpuOp::InstantiateKernel(blade_shape));
    }

    fn kernel_group_size(&self, _kernel: &()) -> u32 {
        self.group_size
    }

    fn instantiate_material(
        &mut self,
        _draw_triangles: &RecordedBuffer,
        _frame: &RecordedBuffer,
    ) {
        self.log.borrow_mut().push(GpuOp::InstantiateMaterial);
    }

    fn dispatch(
        &mut self,
        _buffers: &GrassGpuBuffers<RecordingResources>,
        flatten_entries: &RecordedBuffer,
        groups: UVec3,
    ) -> bool {
        if !self.kernel_ready {
            return false;
        }
        self.log.borrow_mut().push(GpuOp::Dispatch {
            groups,
            flatten_bytes: flatten_entries.size,
        });
        true
    }
}
