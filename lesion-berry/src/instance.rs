//! 病灶实例分割: 将二值病灶 mask 划分为 26-连通分量.

use std::collections::VecDeque;
use std::path::Path;

use ndarray::{Array3, ArrayView3};

use crate::consts::MASK_BACKGROUND;
use crate::error::Result;
use crate::{Idx3d, MaskVolume, NiftiHeaderAttr, Volume};

/// 26-邻域偏移量 (面、棱、角相邻), 按 `(dz, dh, dw)` 字典序排列.
const N26: [(isize, isize, isize); 26] = {
    let mut ans = [(0, 0, 0); 26];
    let mut i = 0;
    let mut dz = -1;
    while dz <= 1 {
        let mut dh = -1;
        while dh <= 1 {
            let mut dw = -1;
            while dw <= 1 {
                if dz != 0 || dh != 0 || dw != 0 {
                    ans[i] = (dz, dh, dw);
                    i += 1;
                }
                dw += 1;
            }
            dh += 1;
        }
        dz += 1;
    }
    ans
};

/// 获取 `pos` 的 26 个相邻体素坐标.
///
/// 在数据范围外的坐标会被过滤掉, 不会包含在返回值中.
fn n26_neighbours((z, h, w): Idx3d, (lz, lh, lw): Idx3d) -> impl Iterator<Item = Idx3d> {
    N26.into_iter().filter_map(move |(dz, dh, dw)| {
        let nz = z.checked_add_signed(dz).filter(|v| *v < lz)?;
        let nh = h.checked_add_signed(dh).filter(|v| *v < lh)?;
        let nw = w.checked_add_signed(dw).filter(|v| *v < lw)?;
        Some((nz, nh, nw))
    })
}

/// 病灶实例标签图.
///
/// 0 代表背景, 正整数 `1..=N` 各代表一个 26-连通病灶实例.
#[derive(Debug, Clone)]
pub struct InstanceMap {
    labels: Array3<u32>,
    instances: Vec<Vec<Idx3d>>,
}

impl InstanceMap {
    /// 对病灶 mask 进行 26-连通实例分割. 非 0 体素视为前景.
    #[inline]
    pub fn from_mask(mask: &MaskVolume) -> Self {
        Self::label(mask.data())
    }

    /// 对 `(z, h, w)` 组织的二值数据进行 26-连通实例分割.
    ///
    /// 两个前景体素属于同一个实例, 当且仅当存在一条从其一到另一的
    /// 26-相邻路径, 且路径上的所有体素都是前景.
    ///
    /// 实例按种子体素的行优先序 (`z` 最慢, `w` 最快) 依次编号, 因此对相同输入
    /// 的编号结果总是一致. 其他实现若遍历顺序不同, 编号可能不同.
    pub fn label(mask: ArrayView3<'_, u8>) -> Self {
        let shape = mask.dim();
        let mut labels = Array3::<u32>::zeros(shape);
        let mut instances = Vec::new();
        let mut bfs_q = VecDeque::with_capacity(64);

        for (seed, &v) in mask.indexed_iter() {
            if v == MASK_BACKGROUND || labels[seed] != 0 {
                continue;
            }
            let id = instances.len() as u32 + 1;
            let mut this_instance = Vec::with_capacity(8);

            // 入队时即打标, 保证每个体素只入队一次.
            labels[seed] = id;
            bfs_q.push_back(seed);
            while let Some(cur) = bfs_q.pop_front() {
                this_instance.push(cur);
                for neigh in n26_neighbours(cur, shape) {
                    if mask[neigh] != MASK_BACKGROUND && labels[neigh] == 0 {
                        labels[neigh] = id;
                        bfs_q.push_back(neigh);
                    }
                }
            }
            instances.push(this_instance);
        }

        Self { labels, instances }
    }

    /// 实例个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 是否不存在任何实例.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// 获得实例标签图的一份不可变 shallow copy.
    #[inline]
    pub fn labels(&self) -> ArrayView3<'_, u32> {
        self.labels.view()
    }

    /// 获取编号为 `id` (从 1 开始) 的实例的所有体素下标. 无顺序保证.
    ///
    /// 当 `id` 越界时 panic.
    #[inline]
    pub fn voxels(&self, id: u32) -> &[Idx3d] {
        &self.instances[id as usize - 1]
    }

    /// 按编号升序迭代 `(编号, 体素下标)`.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u32, &[Idx3d])> {
        self.instances
            .iter()
            .enumerate()
            .map(|(i, v)| (i as u32 + 1, v.as_slice()))
    }

    /// 所有实例的体素总数.
    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.instances.iter().map(Vec::len).sum()
    }

    /// 以 `reference` 的空间变换和 header 元信息, 将实例标签图保存为 `int32` nii 文件.
    pub fn save<P: AsRef<Path>, H: NiftiHeaderAttr>(&self, path: P, reference: &H) -> Result<()> {
        let data = self.labels.mapv(|id| id as i32);
        Volume::with_header(reference.header(), data).save(path)
    }
}
