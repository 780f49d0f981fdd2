//! Video ⇄ still-image conversion: sample a video into PNG frames, or
//! assemble numbered stills back into an mp4, with a blob store as scratch
//! space and a pluggable export target for sharing results.

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod rates;
    pub mod video_metadata;
}

pub mod video {
    pub mod domain {
        pub mod codec_error;
        pub mod frame_order;
        pub mod frame_sampler;
        pub mod still_codec;
        pub mod video_reader;
        pub mod video_writer;
    }
    pub mod infrastructure;
}

pub mod storage {
    pub mod domain {
        pub mod blob_store;
        pub mod working_container;
    }
    pub mod infrastructure;
}

pub mod export {
    pub mod domain {
        pub mod exporter;
    }
    pub mod infrastructure;
}

pub mod session {
    pub mod session_state;
}

pub mod pipeline {
    pub mod conversion_settings;
    pub mod decompose_video_use_case;
    pub mod download_result_use_case;
    pub mod pipeline_error;
    pub mod pipeline_logger;
    pub mod recompose_video_use_case;
    pub mod session_results;
    pub mod share_result_use_case;
    pub mod video_assembler;
}
