// ── TR-135 STBService.Components.AudioOutput ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use super::common::Status;
use crate::schema::value::wire_enum;
use crate::schema::wire::csv_list;
use crate::schema::{FieldDescriptor, ManagedEntity, ParamKind, entity_params};

/// Physical audio output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum AudioFormat {
    #[strum(serialize = "DIGITAL-OPTICAL-SP/DIF")]
    DigitalOpticalSpdif,
    #[strum(serialize = "DIGITAL-COAXIAL-SP/DIF")]
    DigitalCoaxialSpdif,
    #[strum(serialize = "ANALOG-5.1-CHANNEL")]
    Analog51Channel,
    #[default]
    #[strum(serialize = "ANALOG-2-CHANNEL")]
    Analog2Channel,
    #[strum(serialize = "HDMI")]
    Hdmi,
    #[strum(serialize = "RF")]
    Rf,
}

wire_enum!(AudioFormat);

/// `Device.Services.STBService.{i}.Components.AudioOutput.{i}.`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioOutput {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "AudioFormat")]
    pub audio_format: AudioFormat,
    /// Percent of the maximum level.
    #[serde(rename = "AudioLevel")]
    pub audio_level: u32,
    #[serde(rename = "CancelMute")]
    pub cancel_mute: bool,
    /// Paths of the SCART connectors this output feeds.
    #[serde(rename = "SCARTs", with = "csv_list")]
    pub scart_references: Vec<String>,
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self {
            enable: false,
            status: Status::Disabled,
            alias: String::new(),
            name: String::new(),
            audio_format: AudioFormat::Analog2Channel,
            audio_level: 50,
            cancel_mute: false,
            scart_references: Vec::new(),
        }
    }
}

static AUDIO_OUTPUT_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(Status::VARIANTS)),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::ro("Name", ParamKind::string(256)),
    FieldDescriptor::rw("AudioFormat", ParamKind::Enum(AudioFormat::VARIANTS)),
    FieldDescriptor::rw("AudioLevel", ParamKind::uint(0, 100)),
    FieldDescriptor::rw("CancelMute", ParamKind::Boolean),
    FieldDescriptor::ro("SCARTs", ParamKind::list(1024)),
];

impl ManagedEntity for AudioOutput {
    const OBJECT_NAME: &'static str = "Device.Services.STBService.{i}.Components.AudioOutput.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        AUDIO_OUTPUT_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Status" => status,
        "Alias" => alias,
        "Name" => name,
        "AudioFormat" => audio_format,
        "AudioLevel" => audio_level,
        "CancelMute" => cancel_mute,
        "SCARTs" => scart_references,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}
