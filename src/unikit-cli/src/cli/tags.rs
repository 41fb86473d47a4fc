//! Tags and layers subcommand definitions

use clap::Subcommand;

#[derive(Subcommand)]
pub enum TagsCommand {
    /// Show the saved tags and layers
    Show,

    /// Replace the saved tags and layers
    Save {
        /// Tag to keep (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// User layer to keep (repeatable)
        #[arg(short, long = "layer")]
        layers: Vec<String>,
    },

    /// Apply the saved tags and layers to TagManager.asset, pruning extras
    Sync,
}
