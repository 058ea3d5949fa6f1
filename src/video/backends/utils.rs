use crate::utils::HandleLike;

/// Backend objects indexed by the handles of `VideoDevice`.
#[derive(Debug)]
pub struct DataVec<T>
where
    T: Sized + Clone,
{
    pub buf: Vec<Option<T>>,
    pub versions: Vec<u32>,
}

impl<T> DataVec<T>
where
    T: Sized + Clone,
{
    pub fn new() -> Self {
        DataVec {
            buf: Vec::new(),
            versions: Vec::new(),
        }
    }

    pub fn get<H: HandleLike>(&self, handle: H) -> Option<&T> {
        let index = handle.index() as usize;
        if let Some(&v) = self.versions.get(index) {
            if v == handle.version() {
                return self.buf[index].as_ref();
            }
        }

        None
    }

    pub fn create<H: HandleLike>(&mut self, handle: H, value: T) {
        let index = handle.index() as usize;

        if self.buf.len() <= index {
            self.buf.resize(index + 1, None);
            self.versions.resize(index + 1, 1);
        }

        self.buf[index] = Some(value);
        self.versions[index] = handle.version();
    }

    pub fn free<H: HandleLike>(&mut self, handle: H) -> Option<T> {
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].take(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.iter().all(|v| v.is_none())
    }

    pub fn len(&self) -> usize {
        self.buf.iter().filter(|v| v.is_some()).count()
    }
}

impl<T> Default for DataVec<T>
where
    T: Sized + Clone,
{
    fn default() -> Self {
        DataVec::new()
    }
}
