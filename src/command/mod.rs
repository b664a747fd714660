pub mod checkbarcode;
pub mod colname;
pub mod fastq;
pub mod lc;
pub mod rc;
pub mod rname;
pub mod sam2pairwise;
pub mod stats;
pub mod tsv;
pub mod wc;

pub use checkbarcode::CheckBarcodeCMD;
pub use colname::ColnameCMD;
pub use fastq::FastqCMD;
pub use lc::LcCMD;
pub use rc::RcCMD;
pub use rname::RnameCMD;
pub use sam2pairwise::Sam2PairwiseCMD;
pub use stats::StatsCMD;
pub use tsv::TsvCMD;
pub use wc::WcCMD;
