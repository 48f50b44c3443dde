use speedvolume_core::bounds::VolumeBounds;
use speedvolume_core::mapper::map_speed_to_volume;
use speedvolume_core::mode::Mode;

/// Speeds from 0 to 150 km/h in 0.25 km/h steps
fn speeds() -> impl Iterator<Item = f64> {
    (0..=600).map(|i| i as f64 * 0.25)
}

fn bounds_grid() -> Vec<VolumeBounds> {
    vec![
        VolumeBounds::new(0, 1),
        VolumeBounds::new(1, 40),
        VolumeBounds::new(0, 15),
        VolumeBounds::new(10, 11),
        VolumeBounds::new(34, 35),
        VolumeBounds::new(0, 100),
        VolumeBounds::new(99, 100),
    ]
}

#[test]
fn test_car_scenarios() {
    let bounds = VolumeBounds::new(1, 40);
    assert_eq!(map_speed_to_volume(5.0, Mode::Car, bounds), 1);
    assert_eq!(map_speed_to_volume(120.0, Mode::Car, bounds), 40);
    assert_eq!(map_speed_to_volume(62.5, Mode::Car, bounds), 21);
}

#[test]
fn test_result_always_within_bounds() {
    for mode in Mode::ALL {
        for bounds in bounds_grid() {
            for speed in speeds() {
                let volume = map_speed_to_volume(speed, mode, bounds);
                assert!(
                    bounds.contains(volume),
                    "{mode} {bounds:?} at {speed} km/h gave {volume}"
                );
            }
        }
    }
}

#[test]
fn test_floor_below_window() {
    for mode in Mode::ALL {
        let floor_speed = mode.speed_range().min_kmh;
        for bounds in bounds_grid() {
            for speed in speeds().take_while(|s| *s < floor_speed) {
                assert_eq!(map_speed_to_volume(speed, mode, bounds), bounds.min);
            }
        }
    }
}

#[test]
fn test_ceiling_at_and_above_window() {
    for mode in Mode::ALL {
        let ceiling_speed = mode.speed_range().max_kmh;
        for bounds in bounds_grid() {
            assert_eq!(map_speed_to_volume(ceiling_speed, mode, bounds), bounds.max);
            for speed in speeds().filter(|s| *s >= ceiling_speed) {
                assert_eq!(map_speed_to_volume(speed, mode, bounds), bounds.max);
            }
        }
    }
}

#[test]
fn test_floor_speed_enters_ramp_at_min() {
    for mode in Mode::ALL {
        let bounds = VolumeBounds::new(1, 40);
        let floor_speed = mode.speed_range().min_kmh;
        assert_eq!(map_speed_to_volume(floor_speed, mode, bounds), 1);
    }
}

#[test]
fn test_monotonic_in_speed() {
    for mode in Mode::ALL {
        let range = mode.speed_range();
        for bounds in bounds_grid() {
            let mut previous = map_speed_to_volume(range.min_kmh, mode, bounds);
            let steps = 1000;
            for i in 1..=steps {
                let speed = range.min_kmh + range.span() * i as f64 / steps as f64;
                let volume = map_speed_to_volume(speed, mode, bounds);
                assert!(
                    volume >= previous,
                    "{mode} {bounds:?}: {volume} at {speed} km/h dropped below {previous}"
                );
                previous = volume;
            }
        }
    }
}

#[test]
fn test_midpoint_of_each_mode() {
    let bounds = VolumeBounds::new(0, 10);
    for mode in Mode::ALL {
        let range = mode.speed_range();
        let midpoint = range.min_kmh + range.span() / 2.0;
        assert_eq!(map_speed_to_volume(midpoint, mode, bounds), 5, "{mode}");
    }
}

#[test]
fn test_negative_and_nan_speeds_map_to_floor() {
    let bounds = VolumeBounds::new(7, 20);
    for mode in Mode::ALL {
        assert_eq!(map_speed_to_volume(-10.0, mode, bounds), 7);
        assert_eq!(map_speed_to_volume(f64::NAN, mode, bounds), 7);
        assert_eq!(map_speed_to_volume(f64::INFINITY, mode, bounds), 20);
    }
}
