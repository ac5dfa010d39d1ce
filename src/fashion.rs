//! Fashion-MNIST: 70,000 28x28 grayscale images of clothing in 10 classes, 60,000 for training
//! and 10,000 for testing.
//!
//! The gzip'd IDX files are downloaded on first use and kept decompressed under
//! `<data_root>/FashionMNIST/raw`, a file that is already there is never downloaded again.

use std::{
    error::Error,
    fmt, fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use log::info;
use machine_learning::{MlErr, dataset::Dataset};
use ndarray::Array2;

pub const URL: &str = "http://fashion-mnist.s3-website.eu-central-1.amazonaws.com/";
const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

pub const WIDTH: usize = 28;
pub const HEIGHT: usize = 28;
pub const CLASSES: usize = 10;

/// Errors produced while fetching or decoding the dataset.
#[derive(Debug)]
pub enum DatasetErr {
    Io(io::Error),
    Http(reqwest::Error),
    Format(String),
    Ml(MlErr),
}

impl fmt::Display for DatasetErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetErr::Io(e) => write!(f, "io error: {e}"),
            DatasetErr::Http(e) => write!(f, "download failed: {e}"),
            DatasetErr::Format(msg) => write!(f, "malformed idx file: {msg}"),
            DatasetErr::Ml(e) => write!(f, "invalid dataset: {e}"),
        }
    }
}

impl Error for DatasetErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DatasetErr::Io(e) => Some(e),
            DatasetErr::Http(e) => Some(e),
            DatasetErr::Ml(e) => Some(e),
            DatasetErr::Format(_) => None,
        }
    }
}

impl From<io::Error> for DatasetErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<reqwest::Error> for DatasetErr {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<MlErr> for DatasetErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}

pub type Result<T> = std::result::Result<T, DatasetErr>;

/// A partition of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    fn files(self) -> (&'static str, &'static str) {
        match self {
            Split::Train => (TRAIN_IMAGES, TRAIN_LABELS),
            Split::Test => (TEST_IMAGES, TEST_LABELS),
        }
    }
}

/// Downloads, caches and decodes the Fashion-MNIST partitions.
#[derive(Debug, Clone)]
pub struct FashionMnist {
    raw_dir: PathBuf,
}

impl FashionMnist {
    /// Creates a new `FashionMnist` caching its files under `data_root`.
    pub fn new<P: AsRef<Path>>(data_root: P) -> Self {
        Self {
            raw_dir: data_root.as_ref().join("FashionMNIST").join("raw"),
        }
    }

    /// Returns the directory holding the decompressed files.
    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Loads a partition, downloading its files first if they're not cached.
    ///
    /// Pixels are scaled to `[0, 1]` and flattened into 784 features per row, labels are
    /// one-hot encoded over the 10 classes.
    pub fn load(&self, split: Split) -> Result<Dataset> {
        let (images_name, labels_name) = split.files();

        let images = decode_images(&fs::read(self.fetch(images_name)?)?)?;
        let labels = decode_labels(&fs::read(self.fetch(labels_name)?)?)?;

        if images.nrows() != labels.len() {
            return Err(DatasetErr::Format(format!(
                "{} images but {} labels",
                images.nrows(),
                labels.len()
            )));
        }

        info!("loaded {split:?} partition with {} samples", labels.len());
        Ok(Dataset::from_labels(images, &labels, CLASSES)?)
    }

    /// Returns the path of the decompressed file, downloading it if missing.
    fn fetch(&self, name: &str) -> Result<PathBuf> {
        let path = self.raw_dir.join(name);
        if path.exists() {
            return Ok(path);
        }

        fs::create_dir_all(&self.raw_dir)?;

        let url = format!("{URL}{name}.gz");
        info!("downloading {url}");
        let bytes = reqwest::blocking::get(&url)?.error_for_status()?.bytes()?;

        // written aside first so an interrupted download doesn't look cached
        let partial = self.raw_dir.join(format!("{name}.part"));
        fs::write(&partial, gunzip(&bytes)?)?;
        fs::rename(&partial, &path)?;

        Ok(path)
    }
}

fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

/// Reads the big-endian `u32` header fields that follow the magic number.
fn read_header<const N: usize>(bytes: &[u8], magic: u32) -> Result<[usize; N]> {
    let mut words = bytes
        .chunks_exact(4)
        .take(N + 1)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]));

    match words.next() {
        Some(got) if got == magic => {}
        Some(got) => {
            return Err(DatasetErr::Format(format!(
                "magic number {got}, expected {magic}"
            )));
        }
        None => return Err(DatasetErr::Format("missing header".into())),
    }

    let mut header = [0; N];
    for field in header.iter_mut() {
        *field = words
            .next()
            .ok_or_else(|| DatasetErr::Format("truncated header".into()))?
            as usize;
    }

    Ok(header)
}

/// Decodes an IDX3 image file into one row of `[0, 1]` pixels per image.
pub fn decode_images(bytes: &[u8]) -> Result<Array2<f32>> {
    let [count, rows, cols] = read_header::<3>(bytes, IMAGES_MAGIC)?;

    if (rows, cols) != (HEIGHT, WIDTH) {
        return Err(DatasetErr::Format(format!(
            "images are {rows}x{cols}, expected {HEIGHT}x{WIDTH}"
        )));
    }

    let size = rows * cols;
    let pixels = &bytes[16..];
    if pixels.len() < count * size {
        return Err(DatasetErr::Format(format!(
            "expected {} pixel bytes, got {}",
            count * size,
            pixels.len()
        )));
    }

    let data = pixels[..count * size]
        .iter()
        .map(|&p| p as f32 / 255.)
        .collect();

    Array2::from_shape_vec((count, size), data).map_err(|e| DatasetErr::Ml(e.into()))
}

/// Decodes an IDX1 label file.
pub fn decode_labels(bytes: &[u8]) -> Result<Vec<u8>> {
    let [count] = read_header::<1>(bytes, LABELS_MAGIC)?;

    let labels = &bytes[8..];
    if labels.len() < count {
        return Err(DatasetErr::Format(format!(
            "expected {count} labels, got {}",
            labels.len()
        )));
    }

    let labels = labels[..count].to_vec();
    if let Some(&label) = labels.iter().find(|&&l| l as usize >= CLASSES) {
        return Err(DatasetErr::Format(format!("label {label} out of range")));
    }

    Ok(labels)
}
