//! Search filter arguments shared by `search`, `count` and `sync`.

use clap::Args;

use chartlink_core::SearchCondition;

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Title contains any of these (comma separated, repeatable)
    #[arg(long, value_delimiter = ',')]
    pub title: Vec<String>,

    /// Artist contains any of these
    #[arg(long, value_delimiter = ',')]
    pub artist: Vec<String>,

    /// Charter contains any of these
    #[arg(long, value_delimiter = ',')]
    pub charter: Vec<String>,

    /// Artist contains none of these
    #[arg(long, value_delimiter = ',')]
    pub exclude_artist: Vec<String>,

    /// Charter contains none of these
    #[arg(long, value_delimiter = ',')]
    pub exclude_charter: Vec<String>,

    /// Some difficulty is at least this level
    #[arg(long)]
    pub min_diff: Option<u32>,

    /// Some difficulty is at most this level
    #[arg(long)]
    pub max_diff: Option<u32>,

    /// Clip is at least this many seconds long
    #[arg(long)]
    pub min_duration: Option<u32>,

    /// Clip is at most this many seconds long
    #[arg(long)]
    pub max_duration: Option<u32>,

    /// Start from the last saved filter
    #[arg(long)]
    pub saved: bool,
}

impl FilterArgs {
    /// Overlay the given fields on `base`; fields left out keep their base value.
    pub fn apply(&self, mut base: SearchCondition) -> SearchCondition {
        overlay_list(&mut base.title, &self.title);
        overlay_list(&mut base.artist, &self.artist);
        overlay_list(&mut base.charter, &self.charter);
        overlay_list(&mut base.exclude_artist, &self.exclude_artist);
        overlay_list(&mut base.exclude_charter, &self.exclude_charter);

        base.min_diff_level = self.min_diff.or(base.min_diff_level);
        base.max_diff_level = self.max_diff.or(base.max_diff_level);
        base.min_duration = self.min_duration.or(base.min_duration);
        base.max_duration = self.max_duration.or(base.max_duration);
        base
    }
}

fn overlay_list(target: &mut Vec<String>, values: &[String]) {
    if !values.is_empty() {
        *target = values.iter().map(|v| v.trim().to_string()).collect();
    }
}
