/// Size of the buffer list header (`AudioBufferList` with its first entry).
pub const LIST_HEADER_BYTES: usize = 24;

/// Size of one per-channel buffer descriptor (`AudioBuffer`).
pub const DESCRIPTOR_BYTES: usize = 16;

const SAMPLE_BYTES: usize = std::mem::size_of::<f32>();

/// One channel entry of the scratch buffer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDescriptor {
    pub number_channels: u32,
    /// Bytes the hardware may write. Must be re-set before every render.
    pub data_byte_size: u32,
    offset: usize,
}

/// Reusable render target holding one callback's worth of captured audio.
///
/// All channel regions share a single contiguous sample block. The block
/// is only reallocated when a render cycle needs more room than the current
/// per-channel size, so steady-state callbacks never touch the allocator.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    channel_count: u32,
    descriptors: Vec<BufferDescriptor>,
    samples: Vec<f32>,
    size_in_bytes: u32,
    allocated_bytes: usize,
    allocations: u64,
}

impl ScratchBuffer {
    pub fn new(channel_count: u32) -> Self {
        Self {
            channel_count,
            ..Default::default()
        }
    }

    /// Lay out `channel_count` descriptors, each owning a private
    /// `size_in_bytes` region.
    ///
    /// Returns `false` and leaves the buffer untouched for a zero size or a
    /// zero channel count.
    pub fn allocate(&mut self, size_in_bytes: u32) -> bool {
        let total = Self::total_bytes(self.channel_count, size_in_bytes);
        if size_in_bytes == 0 || self.channel_count == 0 {
            log::error!("Invalid buffer size for allocation: {} bytes", total);
            return false;
        }

        let region_len = (size_in_bytes as usize).div_ceil(SAMPLE_BYTES);
        let channels = self.channel_count as usize;

        self.samples.resize(region_len * channels, 0.0);
        self.descriptors.clear();
        self.descriptors.extend((0..channels).map(|index| BufferDescriptor {
            number_channels: 1,
            data_byte_size: size_in_bytes,
            offset: index * region_len,
        }));

        self.size_in_bytes = size_in_bytes;
        self.allocated_bytes = total;
        self.allocations += 1;
        true
    }

    /// Header plus, per channel, one descriptor and `size_in_bytes` of data.
    pub fn total_bytes(channel_count: u32, size_in_bytes: u32) -> usize {
        LIST_HEADER_BYTES + channel_count as usize * (DESCRIPTOR_BYTES + size_in_bytes as usize)
    }

    /// Grow to `needed_bytes` per channel if the buffer is empty or too small.
    ///
    /// Returns whether an allocation happened.
    pub fn ensure_capacity(&mut self, needed_bytes: u32) -> bool {
        if self.is_empty() || self.size_in_bytes < needed_bytes {
            return self.allocate(needed_bytes);
        }
        false
    }

    /// Reset every descriptor's byte size ahead of a render.
    pub fn set_data_byte_sizes(&mut self, bytes: u32) {
        for descriptor in &mut self.descriptors {
            descriptor.data_byte_size = bytes;
        }
    }

    /// Release the block. The next render allocates from scratch.
    pub fn release(&mut self) {
        self.descriptors = Vec::new();
        self.samples = Vec::new();
        self.size_in_bytes = 0;
        self.allocated_bytes = 0;
    }

    /// Change the channel layout. Releases the current block.
    pub fn set_channel_count(&mut self, channel_count: u32) {
        self.release();
        self.channel_count = channel_count;
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Per-channel region size in bytes.
    pub fn size_in_bytes(&self) -> u32 {
        self.size_in_bytes
    }

    /// Total footprint including list header and descriptors.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes
    }

    /// Number of times the block has been (re)allocated.
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    pub fn descriptors(&self) -> &[BufferDescriptor] {
        &self.descriptors
    }

    pub fn descriptors_mut(&mut self) -> &mut [BufferDescriptor] {
        &mut self.descriptors
    }

    /// Samples of channel `index`, limited to its descriptor's byte size.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        let range = self.channel_range(index)?;
        Some(&self.samples[range])
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        let range = self.channel_range(index)?;
        Some(&mut self.samples[range])
    }

    fn channel_range(&self, index: usize) -> Option<std::ops::Range<usize>> {
        let descriptor = self.descriptors.get(index)?;
        let region_len = (self.size_in_bytes as usize).div_ceil(SAMPLE_BYTES);
        let len = (descriptor.data_byte_size as usize / SAMPLE_BYTES).min(region_len);
        Some(descriptor.offset..descriptor.offset + len)
    }
}
