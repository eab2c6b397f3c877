//! Well-known image label keys.

/// Label recording the image name an entry was created under.
pub const IMAGE_NAME: &str = "io.containerd.image.name";

/// OCI annotation carrying the reference name of an image.
pub const OCI_REF_NAME: &str = "org.opencontainers.image.ref.name";

/// Labels that identify an entry by name. They stop describing a live name
/// once the entry is re-created under a digest-qualified name.
pub const NAME_LABELS: &[&str] = &[IMAGE_NAME, OCI_REF_NAME];

/// The default name-identity label set as owned strings.
pub fn default_name_labels() -> Vec<String> {
    NAME_LABELS.iter().map(|l| l.to_string()).collect()
}
