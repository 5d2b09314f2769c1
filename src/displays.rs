//! Displays manager: display maps, modes and SLS (multi-display spanning)

use std::os::raw::c_int;
use std::ptr;

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, Adl, DriverBuffer};
use crate::error::{AdlError, AdlResult};
use crate::ffi::*;

/// Logical and physical identity of a display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayId {
    /// Logical display index
    pub logical_index: i32,
    /// Physical display index
    pub physical_index: i32,
    /// Adapter owning the logical display
    pub logical_adapter: i32,
    /// Adapter driving the physical display
    pub physical_adapter: i32,
}

impl From<ADLDisplayID> for DisplayId {
    fn from(id: ADLDisplayID) -> Self {
        Self {
            logical_index: id.iDisplayLogicalIndex,
            physical_index: id.iDisplayPhysicalIndex,
            logical_adapter: id.iDisplayLogicalAdapterIndex,
            physical_adapter: id.iDisplayPhysicalAdapterIndex,
        }
    }
}

impl From<DisplayId> for ADLDisplayID {
    fn from(id: DisplayId) -> Self {
        Self {
            iDisplayLogicalIndex: id.logical_index,
            iDisplayPhysicalIndex: id.physical_index,
            iDisplayLogicalAdapterIndex: id.logical_adapter,
            iDisplayPhysicalAdapterIndex: id.physical_adapter,
        }
    }
}

/// A display mode
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayMode {
    pub adapter: i32,
    pub display: DisplayId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub colour_depth: i32,
    pub refresh_rate: f32,
    pub orientation: i32,
    pub flags: i32,
    pub mask: i32,
    pub value: i32,
}

impl From<ADLMode> for DisplayMode {
    fn from(mode: ADLMode) -> Self {
        Self {
            adapter: mode.iAdapterIndex,
            display: mode.displayID.into(),
            x: mode.iXPos,
            y: mode.iYPos,
            width: mode.iXRes,
            height: mode.iYRes,
            colour_depth: mode.iColourDepth,
            refresh_rate: mode.fRefreshRate,
            orientation: mode.iOrientation,
            flags: mode.iModeFlag,
            mask: mode.iModeMask,
            value: mode.iModeValue,
        }
    }
}

impl From<DisplayMode> for ADLMode {
    fn from(mode: DisplayMode) -> Self {
        Self {
            iAdapterIndex: mode.adapter,
            displayID: mode.display.into(),
            iXPos: mode.x,
            iYPos: mode.y,
            iXRes: mode.width,
            iYRes: mode.height,
            iColourDepth: mode.colour_depth,
            fRefreshRate: mode.refresh_rate,
            iOrientation: mode.orientation,
            iModeFlag: mode.flags,
            iModeMask: mode.mask,
            iModeValue: mode.value,
        }
    }
}

/// A desktop surface and the range of targets it drives
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayMap {
    pub index: i32,
    pub mode: DisplayMode,
    pub target_count: i32,
    pub first_target: i32,
    pub mask: i32,
    pub value: i32,
}

/// A display driven by a map
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayTarget {
    pub display: DisplayId,
    pub map_index: i32,
    pub mask: i32,
    pub value: i32,
}

/// Display maps with the flat target array they index into
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayMapConfig {
    /// Desktop surfaces
    pub maps: Vec<DisplayMap>,
    /// Targets of every map, each map owning a contiguous range
    pub targets: Vec<DisplayTarget>,
}

impl DisplayMapConfig {
    /// Targets belonging to `map`; an out-of-range slice yields nothing
    pub fn targets_for(&self, map: &DisplayMap) -> &[DisplayTarget] {
        let (Ok(first), Ok(count)) = (usize::try_from(map.first_target), usize::try_from(map.target_count)) else {
            return &[];
        };
        first
            .checked_add(count)
            .and_then(|end| self.targets.get(first..end))
            .unwrap_or(&[])
    }
}

impl From<ADLDisplayMap> for DisplayMap {
    fn from(map: ADLDisplayMap) -> Self {
        Self {
            index: map.iDisplayMapIndex,
            mode: map.displayMode.into(),
            target_count: map.iNumDisplayTarget,
            first_target: map.iFirstDisplayTargetArrayIndex,
            mask: map.iDisplayMapMask,
            value: map.iDisplayMapValue,
        }
    }
}

impl From<DisplayMap> for ADLDisplayMap {
    fn from(map: DisplayMap) -> Self {
        Self {
            iDisplayMapIndex: map.index,
            displayMode: map.mode.into(),
            iNumDisplayTarget: map.target_count,
            iFirstDisplayTargetArrayIndex: map.first_target,
            iDisplayMapMask: map.mask,
            iDisplayMapValue: map.value,
        }
    }
}

impl From<ADLDisplayTarget> for DisplayTarget {
    fn from(target: ADLDisplayTarget) -> Self {
        Self {
            display: target.displayID.into(),
            map_index: target.iDisplayMapIndex,
            mask: target.iDisplayTargetMask,
            value: target.iDisplayTargetValue,
        }
    }
}

impl From<DisplayTarget> for ADLDisplayTarget {
    fn from(target: DisplayTarget) -> Self {
        Self {
            displayID: target.display.into(),
            iDisplayMapIndex: target.map_index,
            iDisplayTargetMask: target.mask,
            iDisplayTargetValue: target.value,
        }
    }
}

/// SLS grid shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlsGrid {
    /// Grid index
    pub index: i32,
    /// Rows
    pub rows: i32,
    /// Columns
    pub columns: i32,
    /// Mask of valid bits in `value`
    pub mask: i32,
    /// Grid flags
    pub value: i32,
}

/// A display placed in an SLS grid
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SlsTarget {
    /// Display driven at this position
    pub target: DisplayTarget,
    /// Grid column
    pub grid_x: i32,
    /// Grid row
    pub grid_y: i32,
    /// Size of the view on this display
    pub view: DisplayMode,
}

/// One SLS configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlsMap {
    /// Adapter owning the map
    pub adapter: i32,
    /// SLS map index
    pub index: i32,
    /// Grid shape
    pub grid: SlsGrid,
    /// Surface map index
    pub surface_map: i32,
    /// Orientation in degrees
    pub orientation: i32,
    /// Displays in the grid
    pub targets: Vec<SlsTarget>,
    /// Native modes of the spanned surface
    pub native_modes: Vec<DisplayMode>,
    /// Bezel-compensated modes
    pub bezel_modes: Vec<DisplayMode>,
    /// Transient modes
    pub transient_modes: Vec<DisplayMode>,
    /// Number of bezel offsets reported
    pub bezel_offsets: usize,
    /// Mask of valid bits in `value`
    pub mask: i32,
    /// Map flags; bit 0 set when the map is active
    pub value: i32,
}

/// Desktop capability bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopCaps {
    /// Supported capabilities
    pub value: i32,
    /// Mask of valid bits in `value`
    pub mask: i32,
}

impl Adl {
    /// Current display maps and their targets
    pub fn display_map_config(&self, adapter: i32, options: i32) -> AdlResult<DisplayMapConfig> {
        let (mut map_count, mut target_count): (c_int, c_int) = (0, 0);
        let mut maps: *mut ADLDisplayMap = ptr::null_mut();
        let mut targets: *mut ADLDisplayTarget = ptr::null_mut();
        let result = adl_call!(
            self,
            ADL2_Display_DisplayMapConfig_Get(
                adapter,
                &mut map_count,
                &mut maps,
                &mut target_count,
                &mut targets,
                options,
            )
        );
        // SAFETY: both arrays come from the allocation callback; take them
        // before checking the status so they are freed on every path.
        let maps = unsafe { DriverBuffer::from_raw(maps, map_count) };
        let targets = unsafe { DriverBuffer::from_raw(targets, target_count) };
        result?;

        Ok(DisplayMapConfig {
            maps: maps.as_slice().iter().copied().map(DisplayMap::from).collect(),
            targets: targets
                .as_slice()
                .iter()
                .copied()
                .map(DisplayTarget::from)
                .collect(),
        })
    }

    /// Apply a display map configuration
    pub fn set_display_map_config(&self, adapter: i32, config: &DisplayMapConfig) -> AdlResult<()> {
        for map in &config.maps {
            let end = map.first_target.saturating_add(map.target_count);
            if map.first_target < 0 || map.target_count < 0 || end as usize > config.targets.len() {
                return Err(AdlError::InvalidParameter(format!(
                    "display map {} references targets outside the target list",
                    map.index
                )));
            }
        }

        let mut maps: Vec<ADLDisplayMap> = config.maps.iter().copied().map(Into::into).collect();
        let mut targets: Vec<ADLDisplayTarget> =
            config.targets.iter().copied().map(Into::into).collect();
        adl_call!(
            self,
            ADL2_Display_DisplayMapConfig_Set(
                adapter,
                maps.len() as c_int,
                maps.as_mut_ptr(),
                targets.len() as c_int,
                targets.as_mut_ptr(),
            )
        )?;
        Ok(())
    }

    /// Modes of one display, or of every display when `display` is -1
    pub fn display_modes(&self, adapter: i32, display: i32) -> AdlResult<Vec<DisplayMode>> {
        let mut count: c_int = 0;
        let mut modes: *mut ADLMode = ptr::null_mut();
        let result = adl_call!(self, ADL2_Display_Modes_Get(adapter, display, &mut count, &mut modes));
        // SAFETY: allocated through the callback.
        let modes = unsafe { DriverBuffer::from_raw(modes, count) };
        result?;
        Ok(modes.as_slice().iter().copied().map(DisplayMode::from).collect())
    }

    /// Indexes of the SLS maps defined on an adapter
    pub fn sls_map_indexes(&self, adapter: i32, options: i32) -> AdlResult<Vec<i32>> {
        let mut count: c_int = 0;
        let mut list: *mut c_int = ptr::null_mut();
        let result = adl_call!(
            self,
            ADL2_Display_SLSMapIndexList_Get(adapter, &mut count, &mut list, options)
        );
        // SAFETY: allocated through the callback.
        let list = unsafe { DriverBuffer::from_raw(list, count) };
        result?;
        Ok(list.to_vec())
    }

    /// One SLS map with its targets and modes
    pub fn sls_map(&self, adapter: i32, index: i32, options: i32) -> AdlResult<SlsMap> {
        let mut map = ADLSLSMap::default();
        let (mut target_count, mut native_count, mut bezel_count): (c_int, c_int, c_int) = (0, 0, 0);
        let (mut transient_count, mut offset_count): (c_int, c_int) = (0, 0);
        let mut targets: *mut ADLSLSTarget = ptr::null_mut();
        let mut native: *mut ADLSLSMode = ptr::null_mut();
        let mut bezel: *mut ADLBezelTransientMode = ptr::null_mut();
        let mut transient: *mut ADLBezelTransientMode = ptr::null_mut();
        let mut offsets: *mut ADLSLSOffset = ptr::null_mut();

        let result = adl_call!(
            self,
            ADL2_Display_SLSMapConfig_Get(
                adapter,
                index,
                &mut map,
                &mut target_count,
                &mut targets,
                &mut native_count,
                &mut native,
                &mut bezel_count,
                &mut bezel,
                &mut transient_count,
                &mut transient,
                &mut offset_count,
                &mut offsets,
                options,
            )
        );
        // SAFETY: every array comes from the allocation callback.
        let (targets, native, bezel, transient, offsets) = unsafe {
            (
                DriverBuffer::from_raw(targets, target_count),
                DriverBuffer::from_raw(native, native_count),
                DriverBuffer::from_raw(bezel, bezel_count),
                DriverBuffer::from_raw(transient, transient_count),
                DriverBuffer::from_raw(offsets, offset_count),
            )
        };
        result?;

        Ok(SlsMap {
            adapter: map.iAdapterIndex,
            index: map.iSLSMapIndex,
            grid: SlsGrid {
                index: map.grid.iSLSGridIndex,
                rows: map.grid.iSLSGridRow,
                columns: map.grid.iSLSGridColumn,
                mask: map.grid.iSLSGridMask,
                value: map.grid.iSLSGridValue,
            },
            surface_map: map.iSurfaceMapIndex,
            orientation: map.iOrientation,
            targets: targets
                .as_slice()
                .iter()
                .map(|t| SlsTarget {
                    target: t.displayTarget.into(),
                    grid_x: t.iSLSGridPositionX,
                    grid_y: t.iSLSGridPositionY,
                    view: t.viewSize.into(),
                })
                .collect(),
            native_modes: native.as_slice().iter().map(|m| m.displayMode.into()).collect(),
            bezel_modes: bezel.as_slice().iter().map(|m| m.displayMode.into()).collect(),
            transient_modes: transient.as_slice().iter().map(|m| m.displayMode.into()).collect(),
            bezel_offsets: offsets.len(),
            mask: map.iSLSMapMask,
            value: map.iSLSMapValue,
        })
    }

    /// Activate or deactivate an SLS map
    pub fn set_sls_state(&self, adapter: i32, index: i32, enabled: bool) -> AdlResult<()> {
        adl_call!(
            self,
            ADL2_Display_SLSMapConfig_SetState(adapter, index, enabled as c_int)
        )?;
        Ok(())
    }

    /// Remove an SLS map
    pub fn delete_sls_map(&self, adapter: i32, index: i32) -> AdlResult<()> {
        adl_call!(self, ADL2_Display_SLSMapConfig_Delete(adapter, index))?;
        Ok(())
    }

    /// Desktop capabilities of an adapter
    pub fn desktop_caps(&self, adapter: i32) -> AdlResult<DesktopCaps> {
        let (mut value, mut mask): (c_int, c_int) = (0, 0);
        adl_call!(self, ADL2_Adapter_Desktop_Caps(adapter, &mut value, &mut mask))?;
        Ok(DesktopCaps { value, mask })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{driver_array, fake_adl};
    use pretty_assertions::assert_eq;

    fn target(map: i32, display: i32) -> ADLDisplayTarget {
        ADLDisplayTarget {
            displayID: ADLDisplayID {
                iDisplayLogicalIndex: display,
                ..Default::default()
            },
            iDisplayMapIndex: map,
            ..Default::default()
        }
    }

    unsafe extern "C" fn map_config(
        _: ADL_CONTEXT_HANDLE,
        _: c_int,
        num_maps: *mut c_int,
        maps: *mut *mut ADLDisplayMap,
        num_targets: *mut c_int,
        targets: *mut *mut ADLDisplayTarget,
        _: c_int,
    ) -> c_int {
        let first = ADLDisplayMap {
            iDisplayMapIndex: 0,
            iNumDisplayTarget: 1,
            iFirstDisplayTargetArrayIndex: 0,
            ..Default::default()
        };
        let second = ADLDisplayMap {
            iDisplayMapIndex: 1,
            iNumDisplayTarget: 2,
            iFirstDisplayTargetArrayIndex: 1,
            ..Default::default()
        };
        *num_maps = 2;
        *maps = driver_array(&[first, second]);
        *num_targets = 3;
        *targets = driver_array(&[target(0, 0), target(1, 1), target(1, 2)]);
        0
    }

    unsafe extern "C" fn no_modes(
        _: ADL_CONTEXT_HANDLE,
        _: c_int,
        _: c_int,
        count: *mut c_int,
        modes: *mut *mut ADLMode,
    ) -> c_int {
        *count = 0;
        *modes = ptr::null_mut();
        0
    }

    unsafe extern "C" fn failing_index_list(
        _: ADL_CONTEXT_HANDLE,
        _: c_int,
        count: *mut c_int,
        list: *mut *mut c_int,
        _: c_int,
    ) -> c_int {
        // a partially filled list is still handed back and must be freed
        *count = 1;
        *list = driver_array(&[4]);
        -8
    }

    #[test]
    fn targets_are_sliced_per_map() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Display_DisplayMapConfig_Get: Some(map_config),
            ..Default::default()
        });
        let config = adl
            .display_map_config(0, ADL_DISPLAY_DISPLAYMAP_OPTION_GPUINFO)
            .unwrap();
        assert_eq!(config.maps.len(), 2);
        assert_eq!(config.targets_for(&config.maps[0]).len(), 1);
        let second: Vec<i32> = config
            .targets_for(&config.maps[1])
            .iter()
            .map(|t| t.display.logical_index)
            .collect();
        assert_eq!(second, vec![1, 2]);
    }

    #[test]
    fn out_of_range_targets_are_empty() {
        let config = DisplayMapConfig {
            maps: vec![],
            targets: vec![DisplayTarget::default()],
        };
        let beyond = DisplayMap {
            first_target: 1,
            target_count: 3,
            ..Default::default()
        };
        let negative = DisplayMap {
            first_target: -1,
            target_count: 1,
            ..Default::default()
        };
        assert!(config.targets_for(&beyond).is_empty());
        assert!(config.targets_for(&negative).is_empty());
    }

    #[test]
    fn set_rejects_dangling_map_ranges() {
        let adl = fake_adl(AdlFunctions::default());
        let config = DisplayMapConfig {
            maps: vec![DisplayMap {
                first_target: 0,
                target_count: 2,
                ..Default::default()
            }],
            targets: vec![DisplayTarget::default()],
        };
        assert!(matches!(
            adl.set_display_map_config(0, &config),
            Err(AdlError::InvalidParameter(_))
        ));
    }

    #[test]
    fn empty_mode_list() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Display_Modes_Get: Some(no_modes),
            ..Default::default()
        });
        assert!(adl.display_modes(0, -1).unwrap().is_empty());
    }

    #[test]
    fn failed_calls_still_release_driver_memory() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Display_SLSMapIndexList_Get: Some(failing_index_list),
            ..Default::default()
        });
        let err = adl.sls_map_indexes(0, ADL_DISPLAY_SLSMAPINDEXLIST_OPTION_ACTIVE).unwrap_err();
        assert!(err.is_not_supported());
    }
}
