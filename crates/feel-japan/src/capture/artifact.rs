use std::path::{Path, PathBuf};

const BROCHURE_PREFIX: &str = "/brochures/";

/// `<category>_<base>.pdf`, named exactly as the capture program files its
/// output: the slug is rooted at `/`, the category is sniffed from it, and the
/// base is the rooted slug minus one `/brochures/` prefix with `/` turned into
/// `-`. A bare slug therefore keeps a leading `-`.
pub fn artifact_file_name(slug: &str) -> String {
    let rooted = if slug.starts_with('/') {
        slug.to_string()
    } else {
        format!("/{slug}")
    };

    let lower = rooted.to_ascii_lowercase();
    let category = if lower.contains("git") {
        "git"
    } else if lower.contains("fit") {
        "fit"
    } else {
        "general"
    };

    let base = rooted
        .strip_prefix(BROCHURE_PREFIX)
        .unwrap_or(&rooted)
        .replace('/', "-");

    format!("{category}_{base}.pdf")
}

pub fn artifact_path(output_dir: &Path, slug: &str) -> PathBuf {
    output_dir.join(artifact_file_name(slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_artifacts_by_category() {
        assert_eq!(
            artifact_file_name("FITOSKSUMMER26.html"),
            "fit_-FITOSKSUMMER26.html.pdf"
        );
        assert_eq!(
            artifact_file_name("git-hokkaido-fit-extension"),
            "git_-git-hokkaido-fit-extension.pdf"
        );
        assert_eq!(artifact_file_name("tokyo/autumn"), "general_-tokyo-autumn.pdf");
    }

    #[test]
    fn brochure_prefix_is_removed_once_from_rooted_slug() {
        assert_eq!(
            artifact_file_name("/brochures/FITOSKSUMMER26.html"),
            "fit_FITOSKSUMMER26.html.pdf"
        );
        assert_eq!(
            artifact_file_name("/brochures/brochures/osaka"),
            "general_brochures-osaka.pdf"
        );
    }

    #[test]
    fn artifact_path_stays_inside_output_dir() {
        let path = artifact_path(Path::new("dist/brochures"), "kyoto-momiji");
        assert_eq!(path, PathBuf::from("dist/brochures/general_-kyoto-momiji.pdf"));
    }
}
