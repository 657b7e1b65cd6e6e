//! MPE zone layout.

use mpe_midi::{Channel, CHANNEL_MAX};

/// MPE zone type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ZoneType {
    /// Manager on channel 1, members counting upwards.
    #[default]
    Lower = 0,
    /// Manager on channel 16, members counting downwards.
    Upper = 1,
}

impl ZoneType {
    pub fn from_index(index: i32) -> Self {
        if index == 1 {
            ZoneType::Upper
        } else {
            ZoneType::Lower
        }
    }

    #[inline]
    pub fn manager_channel(self) -> Channel {
        match self {
            ZoneType::Lower => 0,
            ZoneType::Upper => CHANNEL_MAX,
        }
    }

    /// Step from one member channel to the next.
    #[inline]
    pub fn channel_increment(self) -> i8 {
        match self {
            ZoneType::Lower => 1,
            ZoneType::Upper => -1,
        }
    }
}

/// Active zone: manager channel plus a run of member channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zone {
    pub zone_type: ZoneType,
    pub member_count: u8,
}

impl Zone {
    pub fn new(zone_type: ZoneType, member_count: u8) -> Self {
        Self {
            zone_type,
            member_count: member_count.clamp(1, CHANNEL_MAX),
        }
    }

    #[inline]
    pub fn manager_channel(&self) -> Channel {
        self.zone_type.manager_channel()
    }

    /// Manager channel of the zone on the other end of the channel range.
    #[inline]
    pub fn opposite_manager_channel(&self) -> Channel {
        self.manager_channel() ^ 0x0f
    }

    /// Member channels in allocation order.
    pub fn member_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        (0..self.member_count).map(move |i| self.member_channel(i))
    }

    /// Whether `channel` belongs to the zone's members, and so may be handed
    /// back to the free channel queue.
    pub fn is_member_channel(&self, channel: Channel) -> bool {
        match self.zone_type {
            ZoneType::Lower => (1..=self.member_count).contains(&channel),
            ZoneType::Upper => (CHANNEL_MAX - self.member_count..CHANNEL_MAX).contains(&channel),
        }
    }

    #[inline]
    fn member_channel(&self, index: u8) -> Channel {
        let step = i16::from(self.zone_type.channel_increment());
        (i16::from(self.manager_channel()) + step * (i16::from(index) + 1)) as Channel
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::new(ZoneType::Lower, CHANNEL_MAX)
    }
}
