//! Pressmark engine: export parsing, translation and the IO pipeline.
mod batch;
mod convert;
mod decode;
mod document;
mod extract;
mod fetch;
mod images;
mod persist;
mod pipeline;
mod report;
mod rules;
mod types;
mod writer;

pub use batch::{process_payloads, staggered, Payload, PayloadError};
pub use convert::{prepare_body, Converter, MarkdownTranslator, Rule, RuleSet, TranslateOptions};
pub use html2md::{Handle, StructuredPrinter, TagHandler};
pub use decode::{decode_export, DecodeError, DecodedExport};
pub use document::{
    parse_document, DocumentError, Element, ExportDocument, RawAuthor, RawItem, RawTerm,
};
pub use extract::{
    collect_authors, collect_post_types, extract_records, qualifies, ExtractError, EXCLUDED_TYPES,
};
pub use fetch::{encode_asset_url, FetchSettings, Fetcher, ReqwestFetcher};
pub use images::{collect_attached_images, collect_scraped_images};
pub use persist::{ensure_output_dir, write_atomic, PersistError};
pub use pipeline::{build_records, read_export, PipelineError};
pub use report::{summary_json, write_run_report, ReportError};
pub use types::{
    BatchFailure, BatchReport, FailureKind, FetchError, FetchMetadata, FetchOutput, RunSummary,
};
pub use writer::Materializer;
