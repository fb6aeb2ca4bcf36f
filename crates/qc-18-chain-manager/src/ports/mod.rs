pub mod inbound;
pub mod outbound;

pub use inbound::{AddBlockOutcome, ChainManagerApi};
pub use outbound::{
    AcceptingValidator, BlockValidator, ChainStore, ExportSink, InMemoryChainStore,
    InMemoryExportSink, MempoolSink, MinerSink, NullMempoolSink, NullMinerSink, NullRelaySink,
    NullTicketSink, RelaySink, TicketSink,
};
