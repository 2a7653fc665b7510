//! Browser bindings. The page owns the animation loop and calls one batch
//! per frame; designs are handed out as typed arrays plus shape and strides.

use std::sync::Arc;

use fission_core::classic::LocalSearch;
use fission_core::overhaul::StagedTrainer;
use fission_core::{ClassicDesign, OverhaulDesign, PlannerConfig, Strategy};
use fission_data::{ClassicSettings, OverhaulSettings};
use js_sys::{Float64Array, Int32Array};
use wasm_bindgen::prelude::*;

use crate::engine::CLASSIC_BATCH;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn planner_config(seed: u32) -> PlannerConfig {
    PlannerConfig {
        seed: u64::from(seed),
        ..PlannerConfig::default()
    }
}

#[wasm_bindgen]
pub struct ClassicSample {
    design: Arc<ClassicDesign>,
}

#[wasm_bindgen]
impl ClassicSample {
    pub fn data(&self) -> Int32Array {
        Int32Array::from(self.design.data())
    }

    pub fn shape(&self, axis: usize) -> usize {
        self.design.shape(axis)
    }

    pub fn stride(&self, axis: usize) -> isize {
        self.design.stride(axis)
    }

    pub fn power(&self) -> f64 {
        self.design.metrics().power
    }

    pub fn heat(&self) -> f64 {
        self.design.metrics().heat
    }

    pub fn cooling(&self) -> f64 {
        self.design.metrics().cooling
    }

    #[wasm_bindgen(js_name = netHeat)]
    pub fn net_heat(&self) -> f64 {
        self.design.metrics().net_heat
    }

    #[wasm_bindgen(js_name = dutyCycle)]
    pub fn duty_cycle(&self) -> f64 {
        self.design.metrics().duty_cycle
    }

    #[wasm_bindgen(js_name = avgPower)]
    pub fn avg_power(&self) -> f64 {
        self.design.metrics().effective_power
    }

    #[wasm_bindgen(js_name = avgBreed)]
    pub fn avg_breed(&self) -> f64 {
        self.design.metrics().avg_breed
    }

    pub fn efficiency(&self) -> f64 {
        self.design.metrics().efficiency
    }
}

#[wasm_bindgen]
pub struct FissionOpt {
    search: LocalSearch,
}

#[wasm_bindgen]
impl FissionOpt {
    /// `settings` is the JSON form of the classic settings record.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: &str, seed: u32) -> Result<FissionOpt, JsValue> {
        console_error_panic_hook::set_once();

        let settings: ClassicSettings = fission_io::from_json(settings).map_err(js_error)?;
        let config = planner_config(seed);
        let search =
            LocalSearch::new(&settings, &config.annealing, config.seed).map_err(js_error)?;
        Ok(FissionOpt { search })
    }

    /// Runs one batch and returns the improvement bits.
    #[wasm_bindgen(js_name = stepInteractive)]
    pub fn step_interactive(&mut self) -> u32 {
        let mut improvement = fission_core::Improvement::None;
        for _ in 0..CLASSIC_BATCH {
            improvement |= self.search.step();
        }
        improvement.bits()
    }

    #[wasm_bindgen(js_name = getBest)]
    pub fn best(&self) -> Option<ClassicSample> {
        self.search.best().map(|design| ClassicSample {
            design: Arc::clone(design),
        })
    }

    #[wasm_bindgen(js_name = getBestNoNetHeat)]
    pub fn best_no_net_heat(&self) -> Option<ClassicSample> {
        self.search.best_no_net_heat().map(|design| ClassicSample {
            design: Arc::clone(design),
        })
    }

    pub fn steps(&self) -> f64 {
        self.search.steps() as f64
    }
}

#[wasm_bindgen]
pub struct OverhaulSample {
    design: Arc<OverhaulDesign>,
}

#[wasm_bindgen]
impl OverhaulSample {
    pub fn data(&self) -> Int32Array {
        Int32Array::from(self.design.data())
    }

    pub fn shape(&self, axis: usize) -> usize {
        self.design.shape(axis)
    }

    pub fn stride(&self, axis: usize) -> isize {
        self.design.stride(axis)
    }

    pub fn output(&self) -> f64 {
        self.design.metrics().output
    }

    #[wasm_bindgen(js_name = fuelUse)]
    pub fn fuel_use(&self) -> f64 {
        self.design.metrics().fuel_use
    }

    pub fn efficiency(&self) -> f64 {
        self.design.metrics().efficiency
    }

    #[wasm_bindgen(js_name = irradiatorFlux)]
    pub fn irradiator_flux(&self) -> f64 {
        self.design.metrics().irradiator_flux as f64
    }
}

#[wasm_bindgen]
pub struct OverhaulFissionOpt {
    trainer: StagedTrainer,
}

#[wasm_bindgen]
impl OverhaulFissionOpt {
    /// `settings` is the JSON form of the overhaul settings record.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: &str, seed: u32) -> Result<OverhaulFissionOpt, JsValue> {
        console_error_panic_hook::set_once();

        let settings: OverhaulSettings = fission_io::from_json(settings).map_err(js_error)?;
        let config = planner_config(seed);
        let trainer =
            StagedTrainer::new(&settings, &config.trainer, &config.interactive, config.seed)
                .map_err(js_error)?;
        Ok(OverhaulFissionOpt { trainer })
    }

    #[wasm_bindgen(js_name = stepInteractive)]
    pub fn step_interactive(&mut self) -> u32 {
        self.trainer.step_interactive().bits()
    }

    #[wasm_bindgen(js_name = needsRedrawBest)]
    pub fn needs_redraw_best(&mut self) -> bool {
        self.trainer.needs_redraw_best()
    }

    #[wasm_bindgen(js_name = needsReplotLoss)]
    pub fn needs_replot_loss(&mut self) -> bool {
        self.trainer.needs_replot_loss()
    }

    #[wasm_bindgen(js_name = getLossHistory)]
    pub fn loss_history(&self) -> Float64Array {
        Float64Array::from(self.trainer.loss_history())
    }

    pub fn stage(&self) -> u8 {
        self.trainer.stage().index()
    }

    pub fn episode(&self) -> f64 {
        self.trainer.episode() as f64
    }

    #[wasm_bindgen(js_name = getBest)]
    pub fn best(&self) -> Option<OverhaulSample> {
        self.trainer.best().map(|design| OverhaulSample {
            design: Arc::clone(design),
        })
    }

    /// Planner JSON of the best design.
    #[wasm_bindgen(js_name = exportBest)]
    pub fn export_best(&self) -> Result<String, JsValue> {
        let design = self
            .trainer
            .best()
            .ok_or_else(|| JsValue::from_str("no design yet"))?;
        let doc = fission_io::export_design(design, self.trainer.settings());
        fission_io::to_json_pretty(&doc).map_err(js_error)
    }
}
