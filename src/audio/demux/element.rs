//! Tag dispatch table for the WebM/Opus demuxer.

use std::{collections::HashMap, sync::OnceLock};

use super::ids::*;

/// What the demuxer does when it meets an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementAction {
    /// Container element: keep walking into its children.
    Enter,
    /// Leaf or subtree the demuxer has no use for.
    Skip,
    /// The document type leaf, checked against the expected container.
    DocType,
    /// An audio data block that yields a frame.
    Block,
}

#[derive(Debug, Clone, Copy)]
pub struct ElementSpec {
    pub id: u32,
    pub name: &'static str,
    pub action: ElementAction,
}

const fn spec(id: u32, name: &'static str, action: ElementAction) -> ElementSpec {
    ElementSpec { id, name, action }
}

use ElementAction::{Block, DocType, Enter, Skip};

pub const ELEMENTS: &[ElementSpec] = &[
    spec(EBML, "EBML", Enter),
    spec(EBML_VERSION, "EBMLVersion", Skip),
    spec(EBML_READ_VERSION, "EBMLReadVersion", Skip),
    spec(EBML_MAX_ID_LENGTH, "EBMLMaxIDLength", Skip),
    spec(EBML_MAX_SIZE_LENGTH, "EBMLMaxSizeLength", Skip),
    spec(DOC_TYPE, "DocType", DocType),
    spec(DOC_TYPE_VERSION, "DocTypeVersion", Skip),
    spec(DOC_TYPE_READ_VERSION, "DocTypeReadVersion", Skip),
    spec(DOC_TYPE_EXTENSION, "DocTypeExtension", Skip),
    spec(DOC_TYPE_EXTENSION_NAME, "DocTypeExtensionName", Skip),
    spec(DOC_TYPE_EXTENSION_VERSION, "DocTypeExtensionVersion", Skip),
    spec(VOID, "Void", Skip),
    spec(CRC32, "CRC-32", Skip),
    spec(SEGMENT, "Segment", Enter),
    spec(SEEK_HEAD, "SeekHead", Skip),
    spec(INFO, "Info", Skip),
    spec(CUES, "Cues", Enter),
    spec(CUE_POINT, "CuePoint", Skip),
    spec(CHAPTERS, "Chapters", Skip),
    spec(ATTACHMENTS, "Attachments", Skip),
    spec(TRACKS, "Tracks", Enter),
    spec(TRACK_ENTRY, "TrackEntry", Enter),
    spec(TRACK_NUMBER, "TrackNumber", Skip),
    spec(TRACK_UID, "TrackUID", Skip),
    spec(TRACK_TYPE, "TrackType", Skip),
    spec(FLAG_ENABLED, "FlagEnabled", Skip),
    spec(FLAG_DEFAULT, "FlagDefault", Skip),
    spec(FLAG_FORCED, "FlagForced", Skip),
    spec(FLAG_LACING, "FlagLacing", Skip),
    spec(DEFAULT_DURATION, "DefaultDuration", Skip),
    spec(NAME, "Name", Skip),
    spec(LANGUAGE, "Language", Skip),
    spec(CODEC_ID, "CodecID", Skip),
    spec(CODEC_PRIVATE, "CodecPrivate", Skip),
    spec(CODEC_NAME, "CodecName", Skip),
    spec(CODEC_DELAY, "CodecDelay", Skip),
    spec(SEEK_PRE_ROLL, "SeekPreRoll", Skip),
    spec(AUDIO, "Audio", Enter),
    spec(SAMPLING_FREQUENCY, "SamplingFrequency", Skip),
    spec(OUTPUT_SAMPLING_FREQUENCY, "OutputSamplingFrequency", Skip),
    spec(CHANNELS, "Channels", Skip),
    spec(BIT_DEPTH, "BitDepth", Skip),
    spec(CLUSTER, "Cluster", Enter),
    spec(CLUSTER_TIMECODE, "Timecode", Skip),
    spec(CLUSTER_POSITION, "Position", Skip),
    spec(CLUSTER_PREV_SIZE, "PrevSize", Skip),
    spec(SIMPLE_BLOCK, "SimpleBlock", Block),
    spec(BLOCK_GROUP, "BlockGroup", Enter),
    spec(BLOCK, "Block", Block),
    spec(BLOCK_DURATION, "BlockDuration", Skip),
    spec(REFERENCE_BLOCK, "ReferenceBlock", Skip),
    spec(DISCARD_PADDING, "DiscardPadding", Skip),
    spec(TAGS, "Tags", Enter),
    spec(TAG, "Tag", Enter),
    spec(TARGETS, "Targets", Enter),
    spec(TAG_TRACK_UID, "TagTrackUID", Skip),
    spec(SIMPLE_TAG, "SimpleTag", Enter),
    spec(TAG_NAME, "TagName", Skip),
    spec(TAG_LANGUAGE, "TagLanguage", Skip),
    spec(TAG_STRING, "TagString", Skip),
];

static TABLE: OnceLock<HashMap<u32, ElementSpec>> = OnceLock::new();

/// Looks up a known element. `None` means the demuxer should discard it.
pub fn lookup(id: u32) -> Option<&'static ElementSpec> {
    TABLE
        .get_or_init(|| ELEMENTS.iter().map(|spec| (spec.id, *spec)).collect())
        .get(&id)
}
