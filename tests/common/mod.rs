use fission_core::config::{InteractiveConfig, TrainerConfig};
use fission_core::PlannerConfig;
use fission_data::{ClassicSettings, Fuel, OverhaulSettings, Symmetry};

#[allow(dead_code)]
pub struct ClassicBuilder {
    settings: ClassicSettings,
}

#[allow(dead_code)]
impl ClassicBuilder {
    pub fn new() -> Self {
        Self {
            settings: ClassicSettings {
                size_x: 3,
                size_y: 3,
                size_z: 3,
                ..ClassicSettings::default()
            },
        }
    }

    pub fn with_size(mut self, x: i32, y: i32, z: i32) -> Self {
        self.settings.size_x = x;
        self.settings.size_y = y;
        self.settings.size_z = z;
        self
    }

    pub fn with_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.settings.symmetry = symmetry;
        self
    }

    pub fn with<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut ClassicSettings),
    {
        modifier(&mut self.settings);
        self
    }

    pub fn build(self) -> ClassicSettings {
        self.settings
    }
}

#[allow(dead_code)]
pub struct OverhaulBuilder {
    settings: OverhaulSettings,
}

#[allow(dead_code)]
impl OverhaulBuilder {
    /// A 3x3x3 volume with one self-priming and one source-primed fuel.
    pub fn new() -> Self {
        Self {
            settings: OverhaulSettings {
                size_x: 3,
                size_y: 3,
                size_z: 3,
                fuels: vec![
                    Fuel::new(1.0, 30, 60, true).with_name("[OX] HEA-242"),
                    Fuel::new(0.9, 20, 40, false).with_name("[OX] LEU-235"),
                ],
                ..OverhaulSettings::default()
            },
        }
    }

    pub fn with_size(mut self, x: i32, y: i32, z: i32) -> Self {
        self.settings.size_x = x;
        self.settings.size_y = y;
        self.settings.size_z = z;
        self
    }

    pub fn with<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut OverhaulSettings),
    {
        modifier(&mut self.settings);
        self
    }

    pub fn build(self) -> OverhaulSettings {
        self.settings
    }
}

/// Short stages and a tiny network so a full episode fits in a test.
#[allow(dead_code)]
pub fn quick_config(seed: u64) -> PlannerConfig {
    PlannerConfig {
        seed,
        trainer: TrainerConfig {
            max_converge_train: 60,
            max_converge_infer: 60,
            max_converge_rollout: 120,
            penalty_update_period: 50,
            mini_batch: 4,
            epochs: 1,
            pool_capacity: 64,
            hidden1: 8,
            hidden2: 4,
            trajectory_keep: 2,
            ..TrainerConfig::default()
        },
        interactive: InteractiveConfig {
            min_batch: 64,
            redraw_nagle: 64,
            ..InteractiveConfig::default()
        },
        ..PlannerConfig::default()
    }
}
