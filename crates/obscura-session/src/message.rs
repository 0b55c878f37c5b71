use bitflags::bitflags;

bitflags! {
    /// Message kinds a consumer can selectively enable.
    ///
    /// Enabling/disabling a kind takes immediate effect on subsequent
    /// dispatches; the mask is checked on every delivery, never cached.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MsgKind: u32 {
        const ERROR = 0x001;
        const SHUTTER = 0x002;
        const FOCUS = 0x004;
        const ZOOM = 0x008;
        const PREVIEW_FRAME = 0x010;
        const VIDEO_FRAME = 0x020;
        const POSTVIEW_FRAME = 0x040;
        const RAW_IMAGE = 0x080;
        const COMPRESSED_IMAGE = 0x100;
        const ALL = Self::ERROR.bits()
            | Self::SHUTTER.bits()
            | Self::FOCUS.bits()
            | Self::ZOOM.bits()
            | Self::PREVIEW_FRAME.bits()
            | Self::VIDEO_FRAME.bits()
            | Self::POSTVIEW_FRAME.bits()
            | Self::RAW_IMAGE.bits()
            | Self::COMPRESSED_IMAGE.bits();
    }
}
