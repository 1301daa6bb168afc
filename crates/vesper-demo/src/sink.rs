//! Upload sink that records what would have gone to the GPU.

use vesper_render::{AccessorId, AccessorUpload, UiVertex, UploadSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub accessor: AccessorId,
    pub generation: u32,
    pub vertices: usize,
    pub indices: usize,
}

/// Keeps one record per upload and a running byte count.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Vec<UploadRecord>,
    bytes: usize,
    reallocations: usize,
    generations: Vec<(AccessorId, u32)>,
}

impl RecordingSink {
    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Uploads that would have required new GPU buffers.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl UploadSink for RecordingSink {
    fn upload(&mut self, upload: AccessorUpload<'_>) {
        match self
            .generations
            .iter_mut()
            .find(|(id, _)| *id == upload.accessor)
        {
            Some((_, generation)) if *generation == upload.generation => {}
            Some((_, generation)) => {
                *generation = upload.generation;
                self.reallocations += 1;
            }
            None => {
                self.generations.push((upload.accessor, upload.generation));
                self.reallocations += 1;
            }
        }

        self.bytes += std::mem::size_of_val(upload.vertices) + std::mem::size_of_val(upload.indices);
        self.records.push(UploadRecord {
            accessor: upload.accessor,
            generation: upload.generation,
            vertices: upload.vertices.len(),
            indices: upload.indices.len(),
        });
    }
}
