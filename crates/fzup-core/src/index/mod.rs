//! Models of the remote update indexes.
//!
//! The update server publishes two index formats: a JSON directory of
//! release channels ([`channel`]) and plain HTML directory listings per
//! firmware branch ([`branch`]). Both describe the same set of build
//! artifacts, classified by [`FileType`].

pub mod branch;
pub mod channel;

pub use branch::BranchIndex;
pub use channel::{ChannelIndex, UpdateChannel};

/// Known build artifact types published by the update server.
///
/// The string form matches the `<filetype>_<ext>` portion of artifact
/// file names and the `type` field of the channel index JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileType {
    SdkZip,
    LibZip,
    Core2FirmwareTgz,
    ResourcesTgz,
    ScriptsTgz,
    UpdateTgz,
    FirmwareElf,
    FullBin,
    FullDfu,
    FullJson,
    UpdaterBin,
    UpdaterDfu,
    UpdaterElf,
    UpdaterJson,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::SdkZip => "sdk_zip",
            FileType::LibZip => "lib_zip",
            FileType::Core2FirmwareTgz => "core2_firmware_tgz",
            FileType::ResourcesTgz => "resources_tgz",
            FileType::ScriptsTgz => "scripts_tgz",
            FileType::UpdateTgz => "update_tgz",
            FileType::FirmwareElf => "firmware_elf",
            FileType::FullBin => "full_bin",
            FileType::FullDfu => "full_dfu",
            FileType::FullJson => "full_json",
            FileType::UpdaterBin => "updater_bin",
            FileType::UpdaterDfu => "updater_dfu",
            FileType::UpdaterElf => "updater_elf",
            FileType::UpdaterJson => "updater_json",
        }
    }

    /// Classify an artifact from the `<filetype>` and `<ext>` pieces of
    /// its file name. Unknown combinations yield `None` and are skipped
    /// by the branch index parser.
    pub fn from_parts(kind: &str, ext: &str) -> Option<Self> {
        let key = format!("{}_{}", kind, ext).to_lowercase();
        match key.as_str() {
            "sdk_zip" => Some(FileType::SdkZip),
            "lib_zip" => Some(FileType::LibZip),
            "core2_firmware_tgz" => Some(FileType::Core2FirmwareTgz),
            "resources_tgz" => Some(FileType::ResourcesTgz),
            "scripts_tgz" => Some(FileType::ScriptsTgz),
            "update_tgz" => Some(FileType::UpdateTgz),
            "firmware_elf" => Some(FileType::FirmwareElf),
            "full_bin" => Some(FileType::FullBin),
            "full_dfu" => Some(FileType::FullDfu),
            "full_json" => Some(FileType::FullJson),
            "updater_bin" => Some(FileType::UpdaterBin),
            "updater_dfu" => Some(FileType::UpdaterDfu),
            "updater_elf" => Some(FileType::UpdaterElf),
            "updater_json" => Some(FileType::UpdaterJson),
            _ => None,
        }
    }
}
