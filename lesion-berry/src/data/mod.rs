use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayD, ArrayView3, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::{LesionError, Result};
use crate::Idx3d;

mod save;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// nii 格式 3D 体数据, 包括 header 和按 `(z, h, w)` 组织的体素.
#[derive(Debug, Clone)]
pub struct Volume<T> {
    header: BoxedHeader,
    data: Array3<T>,
}

/// 二值病灶 mask. 非 0 体素为前景.
pub type MaskVolume = Volume<u8>;

/// 解剖标签图, 体素值为器官目录中的整数编码.
pub type AnatomyVolume = Volume<i32>;

/// PET 摄取值 (SUV) 体数据.
pub type PetVolume = Volume<f32>;

/// 3D nii 文件 header 的共用属性.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 按 `[z, h, w]` 顺序排列.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z.abs() as f64, h.abs() as f64, w.abs() as f64]
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel_mm3(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 获取体素的实际体积值, 以毫升为单位.
    #[inline]
    fn voxel_ml(&self) -> f64 {
        self.voxel_mm3() / 1000.0
    }
}

impl<T> NiftiHeaderAttr for Volume<T> {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl<T> Index<Idx3d> for Volume<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

/// 去掉末尾长度为 1 的维度 (如单帧 4D PET), 并将 `[W, H, z]` 转换成 `[z, H, W]`.
///
/// 若剩余维度不是 3, 则将实际形状作为 `Err` 返回.
fn into_zhw<T: Clone>(mut data: ArrayD<T>) -> std::result::Result<Array3<T>, Vec<usize>> {
    while data.ndim() > 3 && data.shape()[data.ndim() - 1] == 1 {
        let last = Axis(data.ndim() - 1);
        data = data.index_axis_move(last, 0);
    }
    let shape = data.shape().to_vec();
    let data = data.into_dimensionality::<Ix3>().map_err(|_| shape)?;

    // hint: 原第一维向下增长, 原第二维向右增长.
    Ok(data.permuted_axes([2, 1, 0]).as_standard_layout().into_owned())
}

macro_rules! impl_open {
    ($($elem: ty),+) => {
        $(
            impl Volume<$elem> {
                /// 打开 nii 文件格式的 3D 体数据. `path` 为 nii 文件的本地路径.
                /// 体素值在读取时按 header 的 `scl_slope`/`scl_inter` 换算后转换为目标类型.
                pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
                    let path = path.as_ref();
                    let obj = ReaderOptions::new().read_file(path)?;
                    let header = Box::new(obj.header().clone());
                    let data = obj.into_volume().into_ndarray::<$elem>()?;
                    let data = into_zhw(data).map_err(|shape| LesionError::Dimensionality {
                        path: path.to_owned(),
                        shape,
                    })?;
                    debug_assert!(data.is_standard_layout());
                    Ok(Self { header, data })
                }
            }
        )+
    };
}

impl_open!(u8, i32, f32);

impl<T> Volume<T> {
    /// 根据已有 header 和 `(z, h, w)` 组织的数据直接创建体数据.
    ///
    /// 一般用于由其他体数据派生新的体数据 (继承空间变换和分辨率).
    #[inline]
    pub fn with_header(header: &NiftiHeader, data: Array3<T>) -> Self {
        Self {
            header: Box::new(header.clone()),
            data,
        }
    }

    /// 根据裸数据和体素分辨率直接创建体数据.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 `(z, h, w)` 组织.
    /// 2. `pix_dim` 按照 `[z, h, w]` 顺序, 以毫米为单位.
    ///
    /// # 注意
    ///
    /// 该方法创建的 header 除分辨率外均为默认值, 因此你应仅将其用于实验或测试目的.
    pub fn fake(data: Array3<T>, pix_dim: [f32; 3]) -> Self {
        let mut header = Box::<NiftiHeader>::default();
        let [z, h, w] = pix_dim;
        let [_, pw, ph, pz, ..] = &mut header.pixdim;
        (*pw, *ph, *pz) = (w, h, z);
        header.intent_name[..4].copy_from_slice(b"fake");
        Self { header, data }
    }

    /// 判断该结构是否是由 `fake` 方法手动拼接的.
    pub fn is_faked(&self) -> bool {
        self.header.intent_name.starts_with(b"fake")
    }

    /// 获取数据形状大小 `(z, h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取数据体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, T> {
        self.data.view()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array3<T> {
        self.data
    }
}

impl<T: Copy> Volume<T> {
    /// 收集 `it` 给出的所有索引对应的体素值.
    ///
    /// 如果存在越界索引, 则程序 panic.
    pub fn gather<'a, I: IntoIterator<Item = &'a Idx3d>>(&self, it: I) -> Vec<T> {
        it.into_iter().map(|pos| self.data[*pos]).collect()
    }
}

impl AnatomyVolume {
    /// 获取解剖标签图中值为 `code` 的体素个数.
    #[inline]
    pub fn count(&self, code: i32) -> usize {
        self.data.iter().filter(|p| **p == code).count()
    }

    /// 收集值为 `code` 的所有体素对应的下标. 结果按行优先存储.
    pub fn positions_of(&self, code: i32) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, &c)| (c == code).then_some(pos))
            .collect()
    }
}

impl MaskVolume {
    /// 病灶 mask 的前景体素个数.
    #[inline]
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|p| **p != crate::consts::MASK_BACKGROUND).count()
    }

    /// 病灶 mask 是否全为背景.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|p| *p == crate::consts::MASK_BACKGROUND)
    }
}
