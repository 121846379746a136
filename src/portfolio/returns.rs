//tracks cumulative bought/sold volume and cost for one instrument's
//position and answers "what is the return if the open remainder were
//marked at price p"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnsCalculator {
    //cumulative units bought and their total cost
    bought_qty: f64,
    bought_cost: f64,

    //cumulative units sold and their total proceeds
    sold_qty: f64,
    sold_proceeds: f64,
}

impl ReturnsCalculator {
    //creates an empty calculator
    pub fn new() -> Self {
        ReturnsCalculator::default()
    }

    //records a buy fill; quantity > 0, price >= 0
    pub fn buy(&mut self, quantity: f64, price: f64) {
        self.bought_qty += quantity;
        self.bought_cost += quantity * price;
    }

    //records a sell fill; quantity > 0, price >= 0
    pub fn sell(&mut self, quantity: f64, price: f64) {
        self.sold_qty += quantity;
        self.sold_proceeds += quantity * price;
    }

    //cumulative units bought since the last update
    pub fn bought_quantity(&self) -> f64 {
        self.bought_qty
    }

    //cumulative units sold since the last update
    pub fn sold_quantity(&self) -> f64 {
        self.sold_qty
    }

    //return on cost with the unmatched remainder marked at the given price.
    //caller precondition: a position with trades must have a nonzero
    //effective cost, otherwise this divides by zero
    pub fn returns(&self, price: f64) -> f64 {
        if self.bought_qty == 0.0 && self.sold_qty == 0.0 {
            return 0.0;
        }

        let (cost, proceeds) = if self.bought_qty == self.sold_qty {
            //fully matched: use the recorded totals as-is
            (self.bought_cost, self.sold_proceeds)
        } else if self.bought_qty > self.sold_qty {
            //net long: mark the excess as sold now
            (
                self.bought_cost,
                self.sold_proceeds + (self.bought_qty - self.sold_qty) * price,
            )
        } else {
            //net short: mark the excess as bought back now
            (
                self.bought_cost + (self.sold_qty - self.bought_qty) * price,
                self.sold_proceeds,
            )
        };

        (proceeds - cost) / cost
    }

    //collapses matched volume and re-bases the open remainder at the given
    //price as the cost basis for the next accounting period
    pub fn update(&mut self, price: f64) {
        if self.bought_qty == self.sold_qty {
            self.bought_qty = 0.0;
            self.sold_qty = 0.0;
        } else if self.bought_qty > self.sold_qty {
            self.bought_qty -= self.sold_qty;
            self.sold_qty = 0.0;
        } else {
            self.sold_qty -= self.bought_qty;
            self.bought_qty = 0.0;
        }

        //re-mark the carried position; matched cost-basis detail is
        //intentionally discarded
        self.bought_cost = self.bought_qty * price;
        self.sold_proceeds = self.sold_qty * price;
    }
}
