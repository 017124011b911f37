use {
    crate::{buffer::TrainKey, store::TrainStore, VolumeId, PAGE_SIZE},
    std::{
        collections::{hash_map::Entry, HashMap},
        fs::{self, File, OpenOptions},
        io::{ErrorKind, Read, Result, Seek, SeekFrom, Write},
        path::{Path, PathBuf},
    },
};

/// Stores each volume as one file, `vol_<n>`, under a data directory.
pub struct FileStore {
    dir: PathBuf,
    opened_files: HashMap<VolumeId, File>,
}

impl FileStore {
    pub fn new(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            opened_files: HashMap::new(),
        })
    }

    pub fn volume_path(&self, vol_no: VolumeId) -> PathBuf {
        self.dir.join(format!("vol_{}", vol_no))
    }

    fn get_file(&mut self, vol_no: VolumeId) -> Result<&mut File> {
        let path = self.volume_path(vol_no);

        Ok(match self.opened_files.entry(vol_no) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let file = OpenOptions::new()
                    .create(true)
                    .read(true)
                    .write(true)
                    .open(path)?;

                entry.insert(file)
            }
        })
    }
}

fn offset(key: &TrainKey) -> u64 {
    key.page_no as u64 * PAGE_SIZE as u64
}

impl TrainStore for FileStore {
    /// Bytes past the end of the volume read as zeroes.
    fn read(&mut self, key: &TrainKey, buf: &mut [u8]) -> Result<()> {
        let file = self.get_file(key.vol_no)?;
        file.seek(SeekFrom::Start(offset(key)))?;

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        buf[filled..].fill(0);

        Ok(())
    }

    fn write(&mut self, key: &TrainKey, buf: &[u8]) -> Result<()> {
        let file = self.get_file(key.vol_no)?;

        file.seek(SeekFrom::Start(offset(key)))?;
        file.write_all(buf)?;
        file.sync_data()
    }
}
