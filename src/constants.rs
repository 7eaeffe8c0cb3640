/// Pattern for residues which are not part of the 20 standard amino acids
///
pub const INVALID_AMINO_ACID_PATTERN: &str = "B|J|O|U|X|Z";

/// Pattern for invalid residues within the dotted core of an annotated sequence, e.g. `[K].PEPTIDE.[R]`
///
pub const INVALID_ANNOTATED_AMINO_ACID_PATTERN: &str = r"\.[A-Z]*(B|J|O|U|X|Z)[A-Z]*\.";

/// Separator for multiple accessions in one accession cell
///
pub const ACCESSION_SEPARATOR: char = ';';

/// Separator used when joining multiple values into one annotation cell
///
pub const VALUE_SEPARATOR: &str = "; ";

/// Padding character for cleavage windows reaching over the protein termini
///
pub const WINDOW_PADDING: char = '-';

/// Name written into the `name` column when no record could be retrieved
///
pub const RECORD_NOT_FOUND_NAME: &str = "HTTPError, not found";

/// Number of C-terminal residues used to pre-filter ragged peptide candidates
///
pub const EXOPEPTIDASE_SUFFIX_LENGTH: usize = 5;

/// Number of bins of the fold change histogram
///
pub const FOLD_CHANGE_HISTOGRAM_BINS: usize = 10;

/// Default UniProt REST endpoint
///
pub const UNIPROT_REST_URL: &str = "https://rest.uniprot.org";

// Annotation column names

pub const QUERY_SEQUENCE_COL: &str = "query_sequence";
pub const QUERY_ACCESSION_COL: &str = "query_accession";
pub const NAME_COL: &str = "name";
pub const FULL_SEQUENCE_COL: &str = "full_sequence";
pub const DESCRIPTION_COL: &str = "description";
pub const KEYWORDS_COL: &str = "keywords";
pub const GO_CODES_COL: &str = "go_codes";
pub const GO_NAMES_COL: &str = "go_names";
pub const PROTEOFORM_CERTAINTY_COL: &str = "proteoform_certainty%";
pub const ACCESSION_LENGTH_COL: &str = "acc_length";
pub const START_PEPTIDE_COL: &str = "start_pep";
pub const END_PEPTIDE_COL: &str = "end_pep";
pub const P1_POSITION_COL: &str = "p1_position";
pub const CLEAVAGE_SITE_COL: &str = "cleavage_site";
pub const NTERM_ANNOTATION_COL: &str = "nterm_annot";
pub const NTERM_MODIFICATION_COL: &str = "nterm_modification";
pub const PROTEASE_UNIPROT_COL: &str = "protease_uniprot";
pub const PROTEASE_MEROPS_CODE_COL: &str = "protease_merops_code";
pub const PROTEASE_MEROPS_NAME_COL: &str = "protease_merops_name";
pub const EXOPEPTIDASE_COL: &str = "exopeptidase";
pub const PREDICTED_PROTEASE_ACTIVITY_COL: &str = "predicted_protease_activity";

/// Values of the `nterm_annot` column for peptides starting inside the protein
///
pub const NTERM_INTERNAL: &str = "Internal";

/// Returns the name of the cleavage window column, e.g. `p4_p4prime`
///
/// # Arguments
/// * `size` - Number of residues on each side of the cleavage site
///
pub fn cleavage_window_column(size: usize) -> String {
    format!("p{size}_p{size}prime")
}
