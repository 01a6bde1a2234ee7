//! VoiceProcessingIO audio unit.
//!
//! The unit owns the boxed [`RenderContext`] whose address is registered as
//! the input callback's refcon, plus a pre-sized `AudioBufferList` used to
//! point the unit at the stream's scratch buffer on every render.

use std::mem;
use std::os::raw::c_void;
use std::ptr;

use coreaudio_sys as sys;

use audio_input_core::models::format::{AudioTimestamp, Bus, RenderActionFlags, StreamFormat};
use audio_input_core::models::status::OsStatus;
use audio_input_core::processing::scratch_buffer::{
    ScratchBuffer, DESCRIPTOR_BYTES, LIST_HEADER_BYTES,
};
use audio_input_core::stream::render::RenderContext;
use audio_input_core::traits::hardware::{
    HardwareUnit, HardwareUnitFactory, VoiceProcessingProperty,
};

use crate::codes::{buffer_list_bytes, PARAM_ERROR};

const _: () = assert!(mem::size_of::<sys::AudioBufferList>() == LIST_HEADER_BYTES);
const _: () = assert!(mem::size_of::<sys::AudioBuffer>() == DESCRIPTOR_BYTES);

/// Instantiates `kAudioUnitSubType_VoiceProcessingIO` units.
pub struct VoiceProcessingIoFactory;

impl HardwareUnitFactory for VoiceProcessingIoFactory {
    fn instantiate_voice_processing_io(&self) -> Result<Box<dyn HardwareUnit>, OsStatus> {
        let description = sys::AudioComponentDescription {
            componentType: sys::kAudioUnitType_Output,
            componentSubType: sys::kAudioUnitSubType_VoiceProcessingIO,
            componentManufacturer: sys::kAudioUnitManufacturer_Apple,
            componentFlags: 0,
            componentFlagsMask: 0,
        };

        let component = unsafe { sys::AudioComponentFindNext(ptr::null_mut(), &description) };
        if component.is_null() {
            log::error!("No VoiceProcessingIO audio component available");
            return Err(PARAM_ERROR);
        }

        let mut unit: sys::AudioUnit = ptr::null_mut();
        OsStatus(unsafe { sys::AudioComponentInstanceNew(component, &mut unit) }).into_result()?;

        Ok(Box::new(VoiceProcessingIoUnit {
            unit,
            initialized: false,
            context: None,
            buffer_list: Vec::new(),
            buffer_capacity: 0,
        }))
    }
}

/// An instantiated VoiceProcessingIO unit. Disposed on drop.
pub struct VoiceProcessingIoUnit {
    unit: sys::AudioUnit,
    initialized: bool,
    context: Option<Box<RenderContext>>,
    /// Backing storage for an `AudioBufferList`; `u64` keeps pointer alignment.
    buffer_list: Vec<u64>,
    buffer_capacity: usize,
}

// SAFETY: the AudioUnit handle is owned exclusively by this value. Control
// calls are serialized by the stream's render lock, and the render callback
// only reaches the unit through that same lock.
unsafe impl Send for VoiceProcessingIoUnit {}

impl VoiceProcessingIoUnit {
    fn set_property<T>(
        &mut self,
        id: sys::AudioUnitPropertyID,
        scope: sys::AudioUnitScope,
        element: u32,
        value: &T,
    ) -> Result<(), OsStatus> {
        let status = unsafe {
            sys::AudioUnitSetProperty(
                self.unit,
                id,
                scope,
                element,
                value as *const T as *const c_void,
                mem::size_of::<T>() as u32,
            )
        };
        OsStatus(status).into_result()
    }

    /// Size the buffer list for `channels` entries.
    fn reserve_buffer_list(&mut self, channels: u32) {
        let words = buffer_list_bytes(channels).div_ceil(mem::size_of::<u64>());
        self.buffer_list = vec![0; words];
        self.buffer_capacity = channels.max(1) as usize;
    }
}

impl HardwareUnit for VoiceProcessingIoUnit {
    fn set_io_enabled(&mut self, bus: Bus, enabled: bool) -> Result<(), OsStatus> {
        let scope = match bus {
            Bus::Input => sys::kAudioUnitScope_Input,
            Bus::Output => sys::kAudioUnitScope_Output,
        };
        let flag: u32 = enabled.into();
        self.set_property(
            sys::kAudioOutputUnitProperty_EnableIO,
            scope,
            bus.element(),
            &flag,
        )
    }

    fn set_stream_format(&mut self, bus: Bus, format: &StreamFormat) -> Result<(), OsStatus> {
        let description = sys::AudioStreamBasicDescription {
            mSampleRate: format.sample_rate,
            mFormatID: sys::kAudioFormatLinearPCM,
            mFormatFlags: sys::kAudioFormatFlagIsFloat | sys::kAudioFormatFlagIsPacked,
            mBytesPerPacket: format.bytes_per_packet,
            mFramesPerPacket: format.frames_per_packet,
            mBytesPerFrame: format.bytes_per_frame,
            mChannelsPerFrame: format.channels_per_frame,
            mBitsPerChannel: format.bits_per_channel,
            mReserved: 0,
        };
        self.set_property(
            sys::kAudioUnitProperty_StreamFormat,
            sys::kAudioUnitScope_Output,
            bus.element(),
            &description,
        )?;
        self.reserve_buffer_list(format.channels_per_frame);
        Ok(())
    }

    fn set_input_callback(&mut self, bus: Bus, context: RenderContext) -> Result<(), OsStatus> {
        let context = Box::new(context);
        let callback = sys::AURenderCallbackStruct {
            inputProc: Some(input_callback_proc),
            inputProcRefCon: &*context as *const RenderContext as *mut c_void,
        };
        // Keep the previous context alive until the unit points elsewhere.
        let previous = self.context.replace(context);
        let result = self.set_property(
            sys::kAudioOutputUnitProperty_SetInputCallback,
            sys::kAudioUnitScope_Global,
            bus.element(),
            &callback,
        );
        if result.is_err() {
            self.context = previous;
        }
        result
    }

    fn initialize(&mut self) -> Result<(), OsStatus> {
        OsStatus(unsafe { sys::AudioUnitInitialize(self.unit) }).into_result()?;
        self.initialized = true;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), OsStatus> {
        OsStatus(unsafe { sys::AudioUnitReset(self.unit, sys::kAudioUnitScope_Global, 0) })
            .into_result()
    }

    fn start(&mut self) -> Result<(), OsStatus> {
        OsStatus(unsafe { sys::AudioOutputUnitStart(self.unit) }).into_result()
    }

    fn stop(&mut self) -> Result<(), OsStatus> {
        OsStatus(unsafe { sys::AudioOutputUnitStop(self.unit) }).into_result()
    }

    fn set_voice_processing_property(
        &mut self,
        property: VoiceProcessingProperty,
        enabled: bool,
    ) -> Result<(), OsStatus> {
        let id = match property {
            VoiceProcessingProperty::BypassVoiceProcessing => {
                sys::kAUVoiceIOProperty_BypassVoiceProcessing
            }
            VoiceProcessingProperty::EnableAgc => sys::kAUVoiceIOProperty_VoiceProcessingEnableAGC,
        };
        let value: u32 = enabled.into();
        self.set_property(id, sys::kAudioUnitScope_Global, Bus::Input.element(), &value)
    }

    fn render(
        &mut self,
        action_flags: &mut RenderActionFlags,
        timestamp: &AudioTimestamp,
        bus: u32,
        frame_count: u32,
        buffers: &mut ScratchBuffer,
    ) -> Result<(), OsStatus> {
        let count = buffers.descriptors().len();
        if count == 0 || count > self.buffer_capacity {
            return Err(PARAM_ERROR);
        }

        let list = self.buffer_list.as_mut_ptr() as *mut sys::AudioBufferList;
        let time_stamp = to_audio_time_stamp(timestamp);

        let status = unsafe {
            (*list).mNumberBuffers = count as u32;
            let entries = (*list).mBuffers.as_mut_ptr();
            for index in 0..count {
                let descriptor = buffers.descriptors()[index];
                let data = buffers
                    .channel_mut(index)
                    .map_or(ptr::null_mut(), |samples| samples.as_mut_ptr());
                *entries.add(index) = sys::AudioBuffer {
                    mNumberChannels: descriptor.number_channels,
                    mDataByteSize: descriptor.data_byte_size,
                    mData: data as *mut c_void,
                };
            }

            let status = sys::AudioUnitRender(
                self.unit,
                &mut action_flags.0,
                &time_stamp,
                bus,
                frame_count,
                list,
            );

            for (index, descriptor) in buffers.descriptors_mut().iter_mut().enumerate() {
                descriptor.data_byte_size = (*entries.add(index)).mDataByteSize;
            }
            status
        };
        OsStatus(status).into_result()
    }
}

impl Drop for VoiceProcessingIoUnit {
    fn drop(&mut self) {
        unsafe {
            if self.initialized {
                sys::AudioUnitUninitialize(self.unit);
            }
            let status = sys::AudioComponentInstanceDispose(self.unit);
            if status != 0 {
                log::warn!("AudioComponentInstanceDispose failed with error {}", status);
            }
        }
        // `context` drops after the instance is gone, so no callback can
        // still be reading it.
    }
}

extern "C" fn input_callback_proc(
    in_ref_con: *mut c_void,
    io_action_flags: *mut sys::AudioUnitRenderActionFlags,
    in_time_stamp: *const sys::AudioTimeStamp,
    in_bus_number: u32,
    in_number_frames: u32,
    _io_data: *mut sys::AudioBufferList,
) -> sys::OSStatus {
    let context = unsafe { &*(in_ref_con as *const RenderContext) };
    let timestamp = unsafe { in_time_stamp.as_ref() }
        .map(from_audio_time_stamp)
        .unwrap_or_default();
    let mut flags = RenderActionFlags(unsafe { io_action_flags.as_ref() }.copied().unwrap_or(0));

    let status = context.on_render(&mut flags, &timestamp, in_bus_number, in_number_frames);

    if let Some(out) = unsafe { io_action_flags.as_mut() } {
        *out = flags.0;
    }
    status.0
}

fn from_audio_time_stamp(raw: &sys::AudioTimeStamp) -> AudioTimestamp {
    AudioTimestamp {
        sample_time: raw.mSampleTime,
        host_time: raw.mHostTime,
        rate_scalar: raw.mRateScalar,
        word_clock_time: raw.mWordClockTime,
        flags: raw.mFlags,
    }
}

fn to_audio_time_stamp(timestamp: &AudioTimestamp) -> sys::AudioTimeStamp {
    // SAFETY: AudioTimeStamp is plain old data; all-zero is a valid SMPTE time.
    let mut raw: sys::AudioTimeStamp = unsafe { mem::zeroed() };
    raw.mSampleTime = timestamp.sample_time;
    raw.mHostTime = timestamp.host_time;
    raw.mRateScalar = timestamp.rate_scalar;
    raw.mWordClockTime = timestamp.word_clock_time;
    raw.mFlags = timestamp.flags;
    raw
}
